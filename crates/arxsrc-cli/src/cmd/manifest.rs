//! `arxsrc manifest` - per-month manifest summary

use anyhow::Result;
use arxsrc_archive::ManifestEntry;
use arxsrc_core::fmt_num;
use comfy_table::{Cell, CellAlignment};

use crate::config::Config;

/// Shards, items, first/last id and total bytes for one month.
struct MonthSummary<'a> {
    yymm: &'a str,
    shards: usize,
    items: u64,
    first: &'a str,
    last: &'a str,
    bytes: Option<u64>,
}

fn summarize<'a>(yymm: &'a str, rows: &'a [ManifestEntry]) -> MonthSummary<'a> {
    MonthSummary {
        yymm,
        shards: rows.len(),
        items: rows.iter().map(|r| u64::from(r.num_items)).sum(),
        first: rows.first().map_or("", |r| r.first_item.as_str()),
        last: rows.last().map_or("", |r| r.last_item.as_str()),
        bytes: rows.iter().map(|r| r.size).sum(),
    }
}

fn fmt_bytes(bytes: Option<u64>) -> String {
    match bytes {
        Some(b) => format!("{:.1} GiB", b as f64 / (1u64 << 30) as f64),
        None => "-".to_string(),
    }
}

pub fn run(config: &Config) -> Result<()> {
    let source = super::open_source(config)?;
    let manifest = source.manifest();

    if manifest.is_empty() {
        eprintln!("Manifest has no shards.");
        return Ok(());
    }

    let mut table = super::table(&["Month", "Shards", "Items", "First", "Last", "Size"]);
    let mut total_items = 0u64;
    for yymm in manifest.months() {
        let s = summarize(yymm, manifest.entries(yymm));
        total_items += s.items;
        table.add_row(vec![
            Cell::new(s.yymm),
            Cell::new(s.shards).set_alignment(CellAlignment::Right),
            Cell::new(fmt_num(s.items as usize)).set_alignment(CellAlignment::Right),
            Cell::new(s.first),
            Cell::new(s.last),
            Cell::new(fmt_bytes(s.bytes)).set_alignment(CellAlignment::Right),
        ]);
    }

    eprintln!("\n{table}");
    eprintln!(
        "{} shards, {} items",
        fmt_num(manifest.len()),
        fmt_num(total_items as usize)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(seq: u32, first: &str, last: &str, n: u32, size: Option<u64>) -> ManifestEntry {
        ManifestEntry {
            num_items: n,
            yymm: "2101".to_string(),
            seq_num: seq,
            first_item: first.to_string(),
            last_item: last.to_string(),
            filename: None,
            size,
            md5sum: None,
            content_md5sum: None,
            timestamp: None,
        }
    }

    #[test]
    fn month_summary() {
        let rows = vec![
            row(1, "2101.00001", "2101.00500", 500, Some(1 << 30)),
            row(2, "2101.00501", "2101.00900", 400, Some(1 << 29)),
        ];
        let s = summarize("2101", &rows);
        assert_eq!(s.shards, 2);
        assert_eq!(s.items, 900);
        assert_eq!(s.first, "2101.00001");
        assert_eq!(s.last, "2101.00900");
        assert_eq!(fmt_bytes(s.bytes), "1.5 GiB");
    }

    #[test]
    fn unknown_size_propagates() {
        let rows = vec![row(1, "a", "b", 1, Some(10)), row(2, "c", "d", 1, None)];
        assert_eq!(summarize("2101", &rows).bytes, None);
        assert_eq!(fmt_bytes(None), "-");
    }
}
