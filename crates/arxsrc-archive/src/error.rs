//! Error type for archive resolution and extraction

use std::io;
use std::path::PathBuf;

/// Coarse classification of an [`ArchiveError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or invalid data source root / manifest
    Configuration,
    /// Identifier (or a manifest bound) is not `YYMM.NNNNN`
    UnsupportedId,
    /// No shard or shard member holds the identifier
    NotFound,
    /// Shard contents violate the one-member-per-identifier layout
    Integrity,
    /// Shard extraction failed
    Extraction,
    /// Shard used before `unpack()`
    Misuse,
    /// Filesystem or decompression failure
    Io,
}

/// Error from the arXiv source archive.
#[derive(Debug)]
pub enum ArchiveError {
    /// Data source root missing or lacking a manifest.
    InvalidSource { path: PathBuf, reason: String },
    /// Manifest document unreadable or malformed.
    Manifest { path: PathBuf, message: String },
    /// Identifier does not have the form `YYMM.NNNNN`.
    UnsupportedId { id: String },
    /// Manifest row whose bounds are not `YYMM.NNNNN`.
    MalformedRange {
        shard: String,
        first_item: String,
        last_item: String,
    },
    /// Identifier absent from the data source.
    NotFound { id: String, reason: String },
    /// More than one shard member matches the identifier.
    AmbiguousEntry {
        id: String,
        shard: String,
        candidates: Vec<PathBuf>,
    },
    /// Shard member with an extension no entry variant handles.
    UnknownFormat { id: String, extension: String },
    /// Extraction of a shard failed; `diagnostics` holds captured output.
    Extraction { archive: PathBuf, diagnostics: String },
    /// Shard accessed before it was unpacked.
    NotUnpacked { shard: String },
    /// I/O failure on `path`.
    Io { path: PathBuf, source: io::Error },
}

impl std::fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSource { path, reason } => {
                write!(f, "invalid data source {}: {reason}", path.display())
            }
            Self::Manifest { path, message } => {
                write!(f, "invalid manifest {}: {message}", path.display())
            }
            Self::UnsupportedId { id } => write!(
                f,
                "unsupported entry ID {id:?}: must be of the form YYMM.NNNNN (e.g. 2101.00001)"
            ),
            Self::MalformedRange {
                shard,
                first_item,
                last_item,
            } => write!(
                f,
                "manifest row for {shard} has invalid bounds {first_item:?}..{last_item:?}: \
                 bounds must be of the form YYMM.NNNNN"
            ),
            Self::NotFound { id, reason } => {
                write!(f, "entry {id} does not exist in data source: {reason}")
            }
            Self::AmbiguousEntry {
                id,
                shard,
                candidates,
            } => write!(
                f,
                "found {} entries with ID {id} in {shard}: {candidates:?}",
                candidates.len()
            ),
            Self::UnknownFormat { id, extension } => {
                write!(f, "unknown file extension {extension:?} for entry {id}")
            }
            Self::Extraction {
                archive,
                diagnostics,
            } => write!(f, "failed to unpack {}:\n{diagnostics}", archive.display()),
            Self::NotUnpacked { shard } => write!(
                f,
                "shard {shard} has not been unpacked; call unpack() before accessing entries"
            ),
            Self::Io { path, source } => write!(f, "IO error on {}: {source}", path.display()),
        }
    }
}

impl std::error::Error for ArchiveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl ArchiveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidSource { .. } | Self::Manifest { .. } => ErrorKind::Configuration,
            Self::UnsupportedId { .. } | Self::MalformedRange { .. } => ErrorKind::UnsupportedId,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AmbiguousEntry { .. } | Self::UnknownFormat { .. } => ErrorKind::Integrity,
            Self::Extraction { .. } => ErrorKind::Extraction,
            Self::NotUnpacked { .. } => ErrorKind::Misuse,
            Self::Io { .. } => ErrorKind::Io,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Attach a path to an I/O error.
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

pub type Result<T, E = ArchiveError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        let unsupported = ArchiveError::UnsupportedId { id: "x".into() };
        assert_eq!(unsupported.kind(), ErrorKind::UnsupportedId);

        let range = ArchiveError::MalformedRange {
            shard: "arXiv_src_2101_001.tar".into(),
            first_item: "bogus".into(),
            last_item: "2101.00010".into(),
        };
        assert_eq!(range.kind(), ErrorKind::UnsupportedId);

        let misuse = ArchiveError::NotUnpacked {
            shard: "arXiv_src_2101_001.tar".into(),
        };
        assert_eq!(misuse.kind(), ErrorKind::Misuse);
    }

    #[test]
    fn not_found_predicate() {
        let err = ArchiveError::NotFound {
            id: "2101.00001".into(),
            reason: "no manifest entry for YYMM 2101".into(),
        };
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "entry 2101.00001 does not exist in data source: no manifest entry for YYMM 2101"
        );
    }

    #[test]
    fn extraction_display_includes_diagnostics() {
        let err = ArchiveError::Extraction {
            archive: PathBuf::from("/data/arXiv_src_2101_001.tar"),
            diagnostics: "tar: Unexpected EOF in archive".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("arXiv_src_2101_001.tar"));
        assert!(msg.contains("Unexpected EOF"));
    }

    #[test]
    fn io_error_has_source() {
        use std::error::Error;
        let err = ArchiveError::io("/tmp/arxiv/x")(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.source().is_some());
    }
}
