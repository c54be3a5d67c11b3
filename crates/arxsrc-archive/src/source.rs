//! Data source: a directory of shards plus their manifest

use std::path::{Path, PathBuf};

use crate::context::WorkingContext;
use crate::entry::Entry;
use crate::error::{ArchiveError, Result};
use crate::extract::{Extractor, ExtractorKind};
use crate::id::ArxivId;
use crate::manifest::{MANIFEST_FILENAME, Manifest};
use crate::shard::Shard;
use crate::temp::TempRoot;

/// Anything that can load an entry by identifier.
///
/// Implemented by [`ArxivDataSource`] (one-shot) and [`WorkingContext`]
/// (batched), so callers can accept either.
pub trait EntrySource {
    fn load_entry(&mut self, id: &str) -> Result<Entry>;
}

/// Data source settings.
#[derive(Debug, Clone, Default)]
pub struct SourceConfig {
    /// Where shards are unpacked and entries decompressed
    pub temp_root: TempRoot,
    pub extractor: ExtractorKind,
}

/// A local copy of the arXiv bulk source archive.
pub struct ArxivDataSource {
    root: PathBuf,
    manifest: Manifest,
    temp: TempRoot,
    extractor: Box<dyn Extractor>,
}

impl std::fmt::Debug for ArxivDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArxivDataSource")
            .field("root", &self.root)
            .field("temp", &self.temp)
            .field("extractor", &self.extractor.name())
            .field("shards", &self.manifest.len())
            .finish()
    }
}

impl ArxivDataSource {
    /// Open a data source with default settings.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        Self::with_config(root, SourceConfig::default())
    }

    pub fn with_config(root: impl AsRef<Path>, config: SourceConfig) -> Result<Self> {
        Self::with_extractor(root, config.temp_root, config.extractor.build())
    }

    /// Open with a custom extraction backend.
    ///
    /// Fails if `root` does not exist or has no manifest; the manifest is
    /// parsed eagerly.
    pub fn with_extractor(
        root: impl AsRef<Path>,
        temp: TempRoot,
        extractor: Box<dyn Extractor>,
    ) -> Result<Self> {
        let root = root.as_ref();
        let invalid = |reason: &str| ArchiveError::InvalidSource {
            path: root.to_path_buf(),
            reason: reason.to_string(),
        };

        if !root.exists() {
            return Err(invalid("does not exist"));
        }
        let root = std::path::absolute(root).map_err(ArchiveError::io(root))?;

        let manifest_path = root.join(MANIFEST_FILENAME);
        if !manifest_path.is_file() {
            return Err(ArchiveError::InvalidSource {
                path: root,
                reason: format!(
                    "no {MANIFEST_FILENAME} found; is this a valid arXiv data source?"
                ),
            });
        }
        let manifest = Manifest::open(&manifest_path)?;

        log::debug!(
            "Opened data source {} ({} shards, temp {}, {})",
            root.display(),
            manifest.len(),
            temp.path().display(),
            extractor.name()
        );

        Ok(Self {
            root,
            manifest,
            temp,
            extractor,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn temp_root(&self) -> &TempRoot {
        &self.temp
    }

    pub(crate) fn extractor(&self) -> &dyn Extractor {
        self.extractor.as_ref()
    }

    /// Shard that holds `id` according to the manifest.
    pub fn shard_for(&self, id: &str) -> Result<Shard> {
        self.shard_for_id(&ArxivId::parse(id)?)
    }

    pub(crate) fn shard_for_id(&self, id: &ArxivId) -> Result<Shard> {
        let path = self.manifest.resolve_id(id)?;
        Ok(Shard::new(path, &self.temp))
    }

    /// Shard by filename (e.g. `arXiv_src_2101_001.tar`) under the root.
    pub fn shard_named(&self, filename: &str) -> Result<Shard> {
        let path = self.manifest.shard_dir().join(filename);
        if !path.is_file() {
            return Err(ArchiveError::InvalidSource {
                path,
                reason: "no such shard in data source".to_string(),
            });
        }
        Ok(Shard::new(path, &self.temp))
    }

    /// Load a single entry: unpack its shard, read the entry, delete the
    /// unpacked shard.
    ///
    /// Every call pays a full shard extraction; use [`Self::new_context`]
    /// for more than one lookup. The decompressed `<temp>/<id>` file stays
    /// until [`TempRoot::clear`].
    pub fn load_entry(&self, id: &str) -> Result<Entry> {
        let id = ArxivId::parse(id)?;
        let shard = self.shard_for_id(&id)?;
        shard.unpack(self.extractor())?;

        let loaded = shard
            .load_entry(&id)
            .and_then(|entry| entry.ok_or_else(|| missing_entry(&id, &shard)));
        let cleanup = shard.delete();

        match (loaded, cleanup) {
            (Ok(entry), Ok(())) => Ok(entry),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(cleanup)) => {
                log::warn!("{}: cleanup after failed lookup: {cleanup}", shard.name());
                Err(e)
            }
        }
    }

    /// Identifiers of every member in a shard, sorted.
    ///
    /// Unpacks the shard for the listing and deletes it afterwards, unless
    /// it was already unpacked.
    pub fn list_shard(&self, filename: &str) -> Result<Vec<String>> {
        let shard = self.shard_named(filename)?;
        let unpacked = shard.unpack(self.extractor())?;
        let ids = shard.list_entry_ids();
        if unpacked {
            if let Err(e) = shard.delete() {
                if ids.is_ok() {
                    return Err(e);
                }
                log::warn!("{}: cleanup after failed listing: {e}", shard.name());
            }
        }
        ids
    }

    /// Start a working context that keeps shards unpacked across lookups.
    ///
    /// Prefer [`Self::with_context`]; a context dropped without
    /// [`WorkingContext::close`] still cleans up but can only log failures.
    pub fn new_context(&self) -> WorkingContext<'_> {
        WorkingContext::new(self)
    }

    /// Run `f` inside a working context, cleaning up on every exit path.
    ///
    /// An error from `f` takes precedence over a cleanup error.
    pub fn with_context<T, E>(
        &self,
        f: impl FnOnce(&mut WorkingContext<'_>) -> std::result::Result<T, E>,
    ) -> std::result::Result<T, E>
    where
        E: From<ArchiveError>,
    {
        let mut ctx = self.new_context();
        let result = f(&mut ctx);
        let cleanup = ctx.close();

        match (result, cleanup) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e.into()),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(cleanup)) => {
                log::warn!("working context cleanup after error: {cleanup}");
                Err(e)
            }
        }
    }
}

impl EntrySource for ArxivDataSource {
    fn load_entry(&mut self, id: &str) -> Result<Entry> {
        ArxivDataSource::load_entry(self, id)
    }
}

/// Shard resolved but holds no member for `id`.
pub(crate) fn missing_entry(id: &ArxivId, shard: &Shard) -> ArchiveError {
    ArchiveError::NotFound {
        id: id.to_string(),
        reason: format!("{} has no member named {id}.*", shard.name()),
    }
}
