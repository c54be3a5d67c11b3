//! Source manifest parsing and identifier → shard resolution
//!
//! The bulk archive ships `arXiv_src_manifest.xml`, a flat list of
//! `<file>` rows, one per shard:
//!
//! ```xml
//! <arXivSRC>
//!   <file>
//!     <filename>src/arXiv_src_2101_001.tar</filename>
//!     <first_item>2101.00001</first_item>
//!     <last_item>2101.00446</last_item>
//!     <num_items>446</num_items>
//!     <seq_num>1</seq_num>
//!     <yymm>2101</yymm>
//!     ...
//!   </file>
//! </arXivSRC>
//! ```
//!
//! Rows are grouped by month and sorted by sequence number; resolution is
//! a linear scan of one month's rows.

use std::path::{Path, PathBuf};

use quick_xml::Reader;
use quick_xml::events::Event;
use rustc_hash::FxHashMap;

use crate::error::{ArchiveError, Result};
use crate::id::{ArxivId, bound_number};

/// Manifest filename at the data source root.
pub const MANIFEST_FILENAME: &str = "arXiv_src_manifest.xml";

/// One `<file>` row of the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub num_items: u32,
    pub yymm: String,
    pub seq_num: u32,
    pub first_item: String,
    pub last_item: String,

    // Informational; not used for resolution
    pub filename: Option<String>,
    pub size: Option<u64>,
    pub md5sum: Option<String>,
    pub content_md5sum: Option<String>,
    pub timestamp: Option<String>,
}

impl ManifestEntry {
    /// Shard filename, e.g. `arXiv_src_2101_001.tar`.
    pub fn shard_filename(&self) -> String {
        format!("arXiv_src_{}_{:03}.tar", self.yymm, self.seq_num)
    }

    /// Inclusive numeric range `[first, last]` covered by this shard.
    pub fn range(&self) -> Result<(u32, u32)> {
        match (bound_number(&self.first_item), bound_number(&self.last_item)) {
            (Some(first), Some(last)) => Ok((first, last)),
            _ => Err(ArchiveError::MalformedRange {
                shard: self.shard_filename(),
                first_item: self.first_item.clone(),
                last_item: self.last_item.clone(),
            }),
        }
    }
}

/// Parsed manifest: month → rows sorted by `seq_num`.
#[derive(Debug)]
pub struct Manifest {
    path: PathBuf,
    months: FxHashMap<String, Vec<ManifestEntry>>,
}

impl Manifest {
    /// Read and parse a manifest file.
    pub fn open(path: &Path) -> Result<Self> {
        let xml = std::fs::read_to_string(path).map_err(|e| ArchiveError::Manifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let manifest = Self::parse(&xml, path)?;
        log::debug!(
            "Loaded manifest {}: {} shards across {} months",
            path.display(),
            manifest.len(),
            manifest.months.len()
        );
        Ok(manifest)
    }

    /// Parse manifest XML. `path` locates the shards (its parent directory)
    /// and labels errors.
    pub fn parse(xml: &str, path: &Path) -> Result<Self> {
        let rows = parse_rows(xml).map_err(|message| ArchiveError::Manifest {
            path: path.to_path_buf(),
            message,
        })?;

        let mut months: FxHashMap<String, Vec<ManifestEntry>> = FxHashMap::default();
        for row in rows {
            months.entry(row.yymm.clone()).or_default().push(row);
        }
        for rows in months.values_mut() {
            rows.sort_by_key(|r| r.seq_num);
        }

        Ok(Self {
            path: path.to_path_buf(),
            months,
        })
    }

    /// Resolve an identifier string to the path of the shard holding it.
    ///
    /// Malformed identifiers fail before any lookup.
    pub fn resolve(&self, id: &str) -> Result<PathBuf> {
        self.resolve_id(&ArxivId::parse(id)?)
    }

    /// Resolve a validated identifier. The first row (lowest `seq_num`)
    /// whose range contains the identifier wins.
    pub fn resolve_id(&self, id: &ArxivId) -> Result<PathBuf> {
        let yymm = id.yymm();
        let num = id.number();

        let rows = self
            .months
            .get(yymm)
            .filter(|rows| !rows.is_empty())
            .ok_or_else(|| ArchiveError::NotFound {
                id: id.to_string(),
                reason: format!("no manifest entry was found for YYMM {yymm}"),
            })?;

        for row in rows {
            let (first, last) = row.range()?;
            if (first..=last).contains(&num) {
                let shard = self.shard_dir().join(row.shard_filename());
                log::debug!("{id} -> {}", shard.display());
                return Ok(shard);
            }
        }

        Err(ArchiveError::NotFound {
            id: id.to_string(),
            reason: format!("no manifest entry for YYMM {yymm} contains item {num}"),
        })
    }

    /// Directory holding the shards (the manifest's own directory).
    pub fn shard_dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }

    /// Months present, ascending.
    pub fn months(&self) -> Vec<&str> {
        let mut months: Vec<&str> = self.months.keys().map(String::as_str).collect();
        months.sort_unstable();
        months
    }

    /// Rows of one month, sorted by `seq_num`.
    pub fn entries(&self, yymm: &str) -> &[ManifestEntry] {
        self.months.get(yymm).map_or(&[], Vec::as_slice)
    }

    /// Total number of rows.
    pub fn len(&self) -> usize {
        self.months.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Field accumulator for one `<file>` row.
#[derive(Default)]
struct RowFields {
    num_items: Option<String>,
    yymm: Option<String>,
    seq_num: Option<String>,
    first_item: Option<String>,
    last_item: Option<String>,
    filename: Option<String>,
    size: Option<String>,
    md5sum: Option<String>,
    content_md5sum: Option<String>,
    timestamp: Option<String>,
}

impl RowFields {
    fn set(&mut self, tag: &[u8], text: String) {
        let slot = match tag {
            b"num_items" => &mut self.num_items,
            b"yymm" => &mut self.yymm,
            b"seq_num" => &mut self.seq_num,
            b"first_item" => &mut self.first_item,
            b"last_item" => &mut self.last_item,
            b"filename" => &mut self.filename,
            b"size" => &mut self.size,
            b"md5sum" => &mut self.md5sum,
            b"content_md5sum" => &mut self.content_md5sum,
            b"timestamp" => &mut self.timestamp,
            _ => return,
        };
        *slot = Some(text);
    }

    fn build(self, row: usize) -> std::result::Result<ManifestEntry, String> {
        fn required(v: Option<String>, row: usize, tag: &str) -> std::result::Result<String, String> {
            v.filter(|s| !s.is_empty())
                .ok_or_else(|| format!("row {row}: missing <{tag}>"))
        }
        fn number<T: std::str::FromStr>(
            v: Option<String>,
            row: usize,
            tag: &str,
        ) -> std::result::Result<T, String> {
            let s = required(v, row, tag)?;
            s.parse()
                .map_err(|_| format!("row {row}: invalid <{tag}> value {s:?}"))
        }

        Ok(ManifestEntry {
            num_items: number(self.num_items, row, "num_items")?,
            yymm: required(self.yymm, row, "yymm")?,
            seq_num: number(self.seq_num, row, "seq_num")?,
            first_item: required(self.first_item, row, "first_item")?,
            last_item: required(self.last_item, row, "last_item")?,
            filename: self.filename,
            size: self.size.and_then(|s| s.parse().ok()),
            md5sum: self.md5sum,
            content_md5sum: self.content_md5sum,
            timestamp: self.timestamp,
        })
    }
}

fn parse_rows(xml: &str) -> std::result::Result<Vec<ManifestEntry>, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut rows = Vec::new();
    let mut saw_root = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"arXivSRC" => saw_root = true,
                b"file" if saw_root => {
                    let row = parse_row(&mut reader, rows.len() + 1)?;
                    rows.push(row);
                }
                other => {
                    if !saw_root {
                        return Err(format!(
                            "unexpected root element <{}>, expected <arXivSRC>",
                            String::from_utf8_lossy(other)
                        ));
                    }
                }
            },
            Ok(Event::Empty(e)) if e.name().as_ref() == b"arXivSRC" => saw_root = true,
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "XML parse error at byte {}: {e}",
                    reader.error_position()
                ));
            }
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err("missing <arXivSRC> root element".to_string());
    }
    if rows.is_empty() {
        log::warn!("Manifest has no <file> rows");
    }
    Ok(rows)
}

/// Parse one `<file>` block, leaving the reader after `</file>`.
fn parse_row(reader: &mut Reader<&[u8]>, row: usize) -> std::result::Result<ManifestEntry, String> {
    let mut fields = RowFields::default();
    let mut buf = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| format!("row {row}: XML parse error: {e}"))?;
        match event {
            Event::Start(e) => {
                let text = reader
                    .read_text(e.name())
                    .map_err(|err| format!("row {row}: XML parse error: {err}"))?;
                fields.set(e.name().as_ref(), text.trim().to_string());
            }
            Event::Empty(e) => fields.set(e.name().as_ref(), String::new()),
            Event::End(e) if e.name().as_ref() == b"file" => break,
            Event::Eof => return Err(format!("row {row}: unexpected end of document")),
            _ => {}
        }
        buf.clear();
    }

    fields.build(row)
}
