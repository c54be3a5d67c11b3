//! Extracted shard members

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

use crate::error::{ArchiveError, Result};
use crate::id::ArxivId;
use crate::temp::TempRoot;

/// One paper's content, as found in a shard.
///
/// Variants are chosen by member file extension; see
/// [`Shard::load_entry`](crate::Shard::load_entry).
#[derive(Debug, Clone)]
pub enum Entry {
    /// `{id}.gz` member
    Gzip(GzipEntry),
}

impl Entry {
    pub fn id(&self) -> &ArxivId {
        match self {
            Self::Gzip(e) => &e.id,
        }
    }

    /// Textual contents, if this variant carries any.
    pub fn contents(&self) -> Option<&str> {
        match self {
            Self::Gzip(e) => Some(&e.contents),
        }
    }
}

/// A gzip-compressed member, decompressed eagerly on construction.
#[derive(Debug, Clone)]
pub struct GzipEntry {
    pub id: ArxivId,
    /// Compressed member inside the unpacked shard
    pub path: PathBuf,
    pub contents: String,
}

impl GzipEntry {
    /// Decompress `path` to `<temp-root>/<id>` and read it back.
    pub fn open(id: ArxivId, path: &Path, temp: &TempRoot) -> Result<Self> {
        let dest = temp.entry_path(id.as_str());
        gunzip(path, &dest)?;

        let bytes = fs::read(&dest).map_err(ArchiveError::io(&dest))?;
        let contents = match String::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) => {
                log::debug!("{id}: contents are not valid UTF-8, decoding lossily");
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };

        Ok(Self {
            id,
            path: path.to_path_buf(),
            contents,
        })
    }
}

/// Decompress a `.gz` file in full to `dest`.
fn gunzip(src: &Path, dest: &Path) -> Result<()> {
    let input = File::open(src).map_err(ArchiveError::io(src))?;
    let mut decoder = GzDecoder::new(BufReader::new(input));
    let output = File::create(dest).map_err(ArchiveError::io(dest))?;
    let mut writer = BufWriter::new(output);

    // Decode errors surface on read, so attribute them to the source
    io::copy(&mut decoder, &mut writer).map_err(ArchiveError::io(src))?;
    io::Write::flush(&mut writer).map_err(ArchiveError::io(dest))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use tempfile::TempDir;

    fn gz(path: &Path, data: &[u8]) {
        let mut enc = GzEncoder::new(File::create(path).unwrap(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap();
    }

    #[test]
    fn decompresses_to_temp_root() {
        let dir = TempDir::new().unwrap();
        let temp = TempRoot::new(dir.path().join("tmp"));
        temp.ensure().unwrap();
        let member = dir.path().join("2101.00001.gz");
        gz(&member, b"\\documentclass{article}\n");

        let id = ArxivId::parse("2101.00001").unwrap();
        let entry = GzipEntry::open(id, &member, &temp).unwrap();

        assert_eq!(entry.contents, "\\documentclass{article}\n");
        assert_eq!(entry.path, member);
        assert_eq!(
            fs::read(temp.entry_path("2101.00001")).unwrap(),
            b"\\documentclass{article}\n"
        );
    }

    #[test]
    fn non_utf8_is_decoded_lossily() {
        let dir = TempDir::new().unwrap();
        let temp = TempRoot::new(dir.path());
        let member = dir.path().join("2101.00002.gz");
        gz(&member, b"caf\xe9");

        let entry = GzipEntry::open(ArxivId::parse("2101.00002").unwrap(), &member, &temp).unwrap();
        assert_eq!(entry.contents, "caf\u{fffd}");
    }

    #[test]
    fn corrupt_member_is_io_error() {
        let dir = TempDir::new().unwrap();
        let temp = TempRoot::new(dir.path().join("tmp"));
        temp.ensure().unwrap();
        let member = dir.path().join("2101.00003.gz");
        fs::write(&member, b"not gzip at all").unwrap();

        let err = GzipEntry::open(ArxivId::parse("2101.00003").unwrap(), &member, &temp)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn entry_accessors() {
        let entry = Entry::Gzip(GzipEntry {
            id: ArxivId::parse("2101.00004").unwrap(),
            path: PathBuf::from("/tmp/arxiv/arXiv_src_2101_001/2101.00004.gz"),
            contents: "hello".into(),
        });
        assert_eq!(entry.id().as_str(), "2101.00004");
        assert_eq!(entry.contents(), Some("hello"));
    }
}
