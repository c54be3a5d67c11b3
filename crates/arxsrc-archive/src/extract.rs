//! Shard extraction backends
//!
//! Shards are plain tarballs whose members sit under one top-level
//! directory (`2101/2101.00001.gz`). Both backends strip that directory so
//! members land directly in the destination.

use std::fmt;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Component, Path, PathBuf};
use std::process::Command;
use std::str::FromStr;

use crate::error::{ArchiveError, Result};

/// Unpacks a shard into an existing directory.
pub trait Extractor {
    /// Extract `archive` into `dest`, stripping one leading path component.
    fn extract(&self, archive: &Path, dest: &Path) -> Result<()>;

    /// Short label for logs.
    fn name(&self) -> &'static str;
}

/// Runs the system `tar` binary.
#[derive(Debug, Clone)]
pub struct SystemTar {
    program: PathBuf,
}

impl SystemTar {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for SystemTar {
    fn default() -> Self {
        Self::new("tar")
    }
}

impl Extractor for SystemTar {
    fn extract(&self, archive: &Path, dest: &Path) -> Result<()> {
        let output = Command::new(&self.program)
            .arg("-xf")
            .arg(archive)
            .arg("-C")
            .arg(dest)
            .arg("--strip-components=1")
            .output()
            .map_err(|e| ArchiveError::Extraction {
                archive: archive.to_path_buf(),
                diagnostics: format!("failed to run {}: {e}", self.program.display()),
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(ArchiveError::Extraction {
                archive: archive.to_path_buf(),
                diagnostics: format!(
                    "{} exited with {}\n{}",
                    self.program.display(),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim_end()
                ),
            })
        }
    }

    fn name(&self) -> &'static str {
        "system-tar"
    }
}

/// In-process extraction with the `tar` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeTar;

impl Extractor for NativeTar {
    fn extract(&self, archive: &Path, dest: &Path) -> Result<()> {
        let failed = |e: std::io::Error| ArchiveError::Extraction {
            archive: archive.to_path_buf(),
            diagnostics: e.to_string(),
        };

        let file = File::open(archive).map_err(ArchiveError::io(archive))?;
        let mut tar = tar::Archive::new(BufReader::new(file));

        for entry in tar.entries().map_err(failed)? {
            let mut entry = entry.map_err(failed)?;
            let path = entry.path().map_err(failed)?.into_owned();

            let Some(relative) = strip_first_component(&path) else {
                log::trace!("skipping {}", path.display());
                continue;
            };

            // Shards hold plain files; links could redirect later members
            // outside `dest`
            let kind = entry.header().entry_type();
            if !(kind.is_file() || kind.is_dir() || kind == tar::EntryType::Continuous) {
                log::warn!(
                    "{}: skipping non-regular member {} ({kind:?})",
                    archive.display(),
                    path.display()
                );
                continue;
            }

            let target = dest.join(&relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(ArchiveError::io(parent))?;
            }
            entry.unpack(&target).map_err(failed)?;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "native-tar"
    }
}

/// Member path with its top-level directory removed.
///
/// `None` for the top-level directory itself and for absolute or `..`
/// paths. Link members are filtered separately in [`NativeTar`].
fn strip_first_component(path: &Path) -> Option<PathBuf> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::Normal(part) => parts.push(part),
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if parts.len() < 2 {
        return None;
    }
    Some(parts[1..].iter().collect())
}

/// Selectable extraction backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractorKind {
    /// `tar -xf <shard> -C <dest> --strip-components=1`
    #[default]
    System,
    /// `tar` crate, no subprocess
    Native,
}

impl ExtractorKind {
    pub fn build(self) -> Box<dyn Extractor> {
        match self {
            Self::System => Box::new(SystemTar::default()),
            Self::Native => Box::new(NativeTar),
        }
    }
}

impl FromStr for ExtractorKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "system" => Ok(Self::System),
            "native" => Ok(Self::Native),
            other => Err(format!(
                "unknown extractor {other:?} (expected \"system\" or \"native\")"
            )),
        }
    }
}

impl fmt::Display for ExtractorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::System => "system",
            Self::Native => "native",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    fn write_shard(path: &Path, members: &[(&str, &[u8])]) {
        let mut builder = tar::Builder::new(File::create(path).unwrap());
        for (name, data) in members {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.finish().unwrap();
    }

    #[test]
    fn strip_first_component_cases() {
        assert_eq!(
            strip_first_component(Path::new("2101/2101.00001.gz")),
            Some(PathBuf::from("2101.00001.gz"))
        );
        assert_eq!(
            strip_first_component(Path::new("./2101/2101.00001.gz")),
            Some(PathBuf::from("2101.00001.gz"))
        );
        assert_eq!(strip_first_component(Path::new("2101")), None);
        assert_eq!(strip_first_component(Path::new("2101/../../etc/passwd")), None);
        assert_eq!(strip_first_component(Path::new("/abs/file.gz")), None);
    }

    #[test]
    fn native_strips_top_level_dir() {
        let dir = TempDir::new().unwrap();
        let shard = dir.path().join("arXiv_src_2101_001.tar");
        write_shard(
            &shard,
            &[("2101/2101.00001.gz", b"one"), ("2101/2101.00002.gz", b"two")],
        );
        let dest = dir.path().join("out");
        fs::create_dir(&dest).unwrap();

        NativeTar.extract(&shard, &dest).unwrap();

        assert_eq!(fs::read(dest.join("2101.00001.gz")).unwrap(), b"one");
        assert_eq!(fs::read(dest.join("2101.00002.gz")).unwrap(), b"two");
        assert!(!dest.join("2101").exists());
    }

    #[test]
    fn native_missing_archive_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = NativeTar
            .extract(&dir.path().join("missing.tar"), dir.path())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn system_tar_failure_captures_stderr() {
        let dir = TempDir::new().unwrap();
        let bogus = dir.path().join("not_a_tar.tar");
        fs::write(&bogus, b"definitely not a tarball").unwrap();

        if Command::new("tar").arg("--version").output().is_err() {
            eprintln!("tar not on PATH, skipping");
            return;
        }

        let err = SystemTar::default()
            .extract(&bogus, dir.path())
            .unwrap_err();
        match err {
            ArchiveError::Extraction { diagnostics, .. } => {
                assert!(diagnostics.starts_with("tar exited with"), "{diagnostics}");
                assert!(
                    diagnostics.lines().skip(1).any(|l| l.contains("tar")),
                    "stderr missing from diagnostics: {diagnostics}"
                );
            }
            other => panic!("expected Extraction, got {other:?}"),
        }
    }

    #[test]
    fn native_skips_links() {
        let dir = TempDir::new().unwrap();
        let outside = dir.path().join("outside");
        fs::create_dir(&outside).unwrap();
        let shard = dir.path().join("arXiv_src_2101_001.tar");

        let mut builder = tar::Builder::new(File::create(&shard).unwrap());
        let mut link = tar::Header::new_gnu();
        link.set_entry_type(tar::EntryType::Symlink);
        link.set_size(0);
        link.set_mode(0o777);
        link.set_link_name(&outside).unwrap();
        link.set_cksum();
        builder
            .append_data(&mut link, "2101/link", std::io::empty())
            .unwrap();
        let mut hard = tar::Header::new_gnu();
        hard.set_entry_type(tar::EntryType::Link);
        hard.set_size(0);
        hard.set_mode(0o644);
        hard.set_link_name("2101/link").unwrap();
        hard.set_cksum();
        builder
            .append_data(&mut hard, "2101/hard.gz", std::io::empty())
            .unwrap();
        let data: &[u8] = b"escaped";
        let mut file = tar::Header::new_gnu();
        file.set_size(data.len() as u64);
        file.set_mode(0o644);
        file.set_cksum();
        builder
            .append_data(&mut file, "2101/link/2101.00001.gz", data)
            .unwrap();
        builder.finish().unwrap();
        drop(builder);

        let dest = dir.path().join("out");
        fs::create_dir(&dest).unwrap();
        NativeTar.extract(&shard, &dest).unwrap();

        assert!(!outside.join("2101.00001.gz").exists());
        assert_eq!(fs::read_dir(&outside).unwrap().count(), 0);
        let link_dir = fs::symlink_metadata(dest.join("link")).unwrap();
        assert!(link_dir.is_dir());
        assert!(!dest.join("hard.gz").exists());
        assert_eq!(fs::read(dest.join("link/2101.00001.gz")).unwrap(), b"escaped");
    }

    #[test]
    fn system_tar_missing_program() {
        let dir = TempDir::new().unwrap();
        let err = SystemTar::new("/nonexistent/bin/tar")
            .extract(&dir.path().join("x.tar"), dir.path())
            .unwrap_err();
        assert!(matches!(err, ArchiveError::Extraction { .. }));
        assert!(err.to_string().contains("failed to run"));
    }

    #[test]
    fn kind_parse_roundtrip() {
        assert_eq!("system".parse::<ExtractorKind>().unwrap(), ExtractorKind::System);
        assert_eq!("native".parse::<ExtractorKind>().unwrap(), ExtractorKind::Native);
        assert!("zip".parse::<ExtractorKind>().is_err());
        assert_eq!(ExtractorKind::Native.to_string(), "native");
        assert_eq!(ExtractorKind::default(), ExtractorKind::System);
    }
}
