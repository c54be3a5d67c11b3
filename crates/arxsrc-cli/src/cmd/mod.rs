pub mod clean;
pub mod entry;
pub mod harvest;
pub mod ids;
pub mod manifest;
pub mod paper;
pub mod resolve;

use anyhow::{Context, Result};
use arxsrc_archive::ArxivDataSource;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use crate::config::Config;

/// Open the configured archive.
pub fn open_source(config: &Config) -> Result<ArxivDataSource> {
    let root = config
        .archive
        .root
        .as_ref()
        .context("No archive root configured (pass --root or set [archive] root)")?;
    ArxivDataSource::with_config(root, config.source_config())
        .with_context(|| format!("Failed to open archive at {}", root.display()))
}

/// Two-column table with a cyan header.
pub fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(header.iter().map(|h| Cell::new(h).fg(Color::Cyan)));
    table
}

pub fn show_config(config: &Config) {
    let mut t = table(&["Setting", "Value"]);

    t.add_row(vec![
        "Archive root",
        &config
            .archive
            .root
            .as_ref()
            .map_or_else(|| "not set".to_string(), |p| p.display().to_string()),
    ]);
    t.add_row(vec![
        "Temp directory",
        &config.archive.temp_dir.display().to_string(),
    ]);
    t.add_row(vec!["Extractor", &config.archive.extractor.to_string()]);
    t.add_row(vec!["S2 API URL", &config.semantic_scholar.api_url]);
    t.add_row(vec![
        "S2 API key",
        if config.semantic_scholar.api_key.is_some() {
            "configured"
        } else {
            "not set"
        },
    ]);
    t.add_row(vec!["OAI URL", &config.oai.url]);
    t.add_row(vec![
        "OAI paging backoff",
        &format!("{}s", config.oai.paging_backoff_secs),
    ]);
    t.add_row(vec![
        "Request timeout",
        &format!("{}s", config.http.request_timeout),
    ]);
    t.add_row(vec!["Max retries", &config.http.max_retries.to_string()]);

    eprintln!("\n{t}");
}
