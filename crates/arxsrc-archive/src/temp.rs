//! Temporary extraction root
//!
//! Unpacked shards live in `<root>/<shard stem>/`, decompressed entries in
//! `<root>/<identifier>`. The root is assumed to be owned exclusively by
//! one process at a time; nothing here locks it.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ArchiveError, Result};

/// Directory name under the system temp dir used by default.
pub const DEFAULT_TEMP_DIR_NAME: &str = "arxiv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempRoot {
    path: PathBuf,
}

impl TempRoot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Unpack directory for a shard: the shard filename without extension.
    pub fn unpack_dir_for(&self, shard: &Path) -> PathBuf {
        let stem = shard.file_stem().unwrap_or(shard.as_os_str());
        self.path.join(stem)
    }

    /// Destination of a decompressed entry.
    pub fn entry_path(&self, id: &str) -> PathBuf {
        self.path.join(id)
    }

    /// Create the root if missing.
    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.path).map_err(ArchiveError::io(&self.path))
    }

    /// Remove everything under the root and recreate it empty.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_dir_all(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(ArchiveError::io(&self.path)(e)),
        }
        log::info!("Cleared {}", self.path.display());
        self.ensure()
    }
}

impl Default for TempRoot {
    /// `<system temp>/arxiv`, i.e. `/tmp/arxiv` on most Unix systems.
    fn default() -> Self {
        Self::new(std::env::temp_dir().join(DEFAULT_TEMP_DIR_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn unpack_dir_strips_extension() {
        let root = TempRoot::new("/tmp/arxiv");
        assert_eq!(
            root.unpack_dir_for(Path::new("/data/arXiv_src_2101_001.tar")),
            PathBuf::from("/tmp/arxiv/arXiv_src_2101_001")
        );
    }

    #[test]
    fn entry_path_is_flat() {
        let root = TempRoot::new("/tmp/arxiv");
        assert_eq!(
            root.entry_path("2101.00001"),
            PathBuf::from("/tmp/arxiv/2101.00001")
        );
    }

    #[test]
    fn default_under_system_temp() {
        let root = TempRoot::default();
        assert!(root.path().starts_with(std::env::temp_dir()));
        assert!(root.path().ends_with("arxiv"));
    }

    #[test]
    fn clear_wipes_and_recreates() {
        let dir = TempDir::new().unwrap();
        let root = TempRoot::new(dir.path().join("arxiv"));
        root.ensure().unwrap();
        fs::create_dir_all(root.path().join("arXiv_src_2101_001")).unwrap();
        fs::write(root.entry_path("2101.00001"), b"stale").unwrap();

        root.clear().unwrap();

        assert!(root.path().is_dir());
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn clear_creates_missing_root() {
        let dir = TempDir::new().unwrap();
        let root = TempRoot::new(dir.path().join("fresh"));
        root.clear().unwrap();
        assert!(root.path().is_dir());
    }
}
