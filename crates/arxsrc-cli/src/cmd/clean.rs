//! `arxsrc clean` - clear the temporary root

use anyhow::{Context, Result};

use crate::config::Config;

/// Removes unpacked shards and decompressed entries left behind by
/// interrupted runs. Does not need an archive root.
pub fn run(config: &Config) -> Result<()> {
    let temp = config.source_config().temp_root;
    temp.clear()
        .with_context(|| format!("Failed to clear {}", temp.path().display()))?;
    eprintln!("Cleared {}", temp.path().display());
    Ok(())
}
