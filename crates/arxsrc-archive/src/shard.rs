//! One `arXiv_src_{yymm}_{seq}.tar` shard and its unpack lifecycle
//!
//! State lives entirely on disk: a shard is unpacked iff its unpack
//! directory exists. `delete()` removes that directory, never the shard.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::entry::{Entry, GzipEntry};
use crate::error::{ArchiveError, Result};
use crate::extract::Extractor;
use crate::id::ArxivId;
use crate::temp::TempRoot;

#[derive(Debug, Clone)]
pub struct Shard {
    path: PathBuf,
    unpack_dir: PathBuf,
    temp: TempRoot,
}

impl Shard {
    pub fn new(path: impl Into<PathBuf>, temp: &TempRoot) -> Self {
        let path = path.into();
        Self {
            unpack_dir: temp.unpack_dir_for(&path),
            path,
            temp: temp.clone(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Shard filename, e.g. `arXiv_src_2101_001.tar`.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .unwrap_or(self.path.as_os_str())
            .to_string_lossy()
            .into_owned()
    }

    /// Where the shard is (or would be) unpacked. May not exist.
    pub fn unpack_dir(&self) -> &Path {
        &self.unpack_dir
    }

    pub fn is_unpacked(&self) -> bool {
        self.unpack_dir.exists()
    }

    /// Unpack into the temp root. No-op if the unpack directory already
    /// exists (its contents are not re-checked).
    ///
    /// Returns whether extraction ran. On failure the partial directory is
    /// removed.
    pub fn unpack(&self, extractor: &dyn Extractor) -> Result<bool> {
        if self.is_unpacked() {
            log::debug!("{}: already unpacked", self.name());
            return Ok(false);
        }

        fs::create_dir_all(&self.unpack_dir).map_err(ArchiveError::io(&self.unpack_dir))?;

        let start = Instant::now();
        if let Err(e) = extractor.extract(&self.path, &self.unpack_dir) {
            if let Err(cleanup) = fs::remove_dir_all(&self.unpack_dir) {
                log::warn!(
                    "{}: failed to remove partial unpack dir {}: {cleanup}",
                    self.name(),
                    self.unpack_dir.display()
                );
            }
            return Err(e);
        }

        log::debug!(
            "{}: unpacked into {} via {} in {:.2?}",
            self.name(),
            self.unpack_dir.display(),
            extractor.name(),
            start.elapsed()
        );
        Ok(true)
    }

    /// Load the member for `id`.
    ///
    /// `Ok(None)` if this shard has no such member; errors if it has more
    /// than one or its extension is not a known entry format.
    pub fn load_entry(&self, id: &ArxivId) -> Result<Option<Entry>> {
        self.ensure_unpacked()?;

        let mut candidates = self.candidates(id)?;
        match candidates.len() {
            0 => return Ok(None),
            1 => {}
            _ => {
                candidates.sort();
                return Err(ArchiveError::AmbiguousEntry {
                    id: id.to_string(),
                    shard: self.name(),
                    candidates,
                });
            }
        }

        let path = candidates.swap_remove(0);
        match path.extension().and_then(OsStr::to_str) {
            Some("gz") => Ok(Some(Entry::Gzip(GzipEntry::open(
                id.clone(),
                &path,
                &self.temp,
            )?))),
            other => Err(ArchiveError::UnknownFormat {
                id: id.to_string(),
                extension: other.map(|ext| format!(".{ext}")).unwrap_or_default(),
            }),
        }
    }

    /// Identifiers physically present (member names minus extension).
    pub fn list_entry_ids(&self) -> Result<Vec<String>> {
        self.ensure_unpacked()?;

        let mut ids = Vec::new();
        for dirent in fs::read_dir(&self.unpack_dir).map_err(ArchiveError::io(&self.unpack_dir))? {
            let dirent = dirent.map_err(ArchiveError::io(&self.unpack_dir))?;
            let path = dirent.path();
            if let Some(stem) = path.file_stem() {
                ids.push(stem.to_string_lossy().into_owned());
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    /// Remove the unpacked directory. Fails if not unpacked.
    pub fn delete(&self) -> Result<()> {
        self.ensure_unpacked()?;
        fs::remove_dir_all(&self.unpack_dir).map_err(ArchiveError::io(&self.unpack_dir))?;
        log::debug!("{}: deleted {}", self.name(), self.unpack_dir.display());
        Ok(())
    }

    fn ensure_unpacked(&self) -> Result<()> {
        if self.is_unpacked() {
            Ok(())
        } else {
            Err(ArchiveError::NotUnpacked { shard: self.name() })
        }
    }

    /// Members named `{id}.<ext>`.
    fn candidates(&self, id: &ArxivId) -> Result<Vec<PathBuf>> {
        let dir = glob::Pattern::escape(&self.unpack_dir.to_string_lossy());
        let pattern = format!("{dir}/{id}.*");
        let paths = glob::glob(&pattern).map_err(|e| ArchiveError::Io {
            path: self.unpack_dir.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()),
        })?;

        let mut matches = Vec::new();
        for path in paths {
            let path = path.map_err(|e| ArchiveError::Io {
                path: e.path().to_path_buf(),
                source: e.into_error(),
            })?;
            if path.file_stem() == Some(OsStr::new(id.as_str())) {
                matches.push(path);
            }
        }
        Ok(matches)
    }
}

/// Shards are equal when they refer to the same file.
impl PartialEq for Shard {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for Shard {}
