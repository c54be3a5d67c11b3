//! `arxsrc entry` - extract paper sources

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use arxsrc_archive::Entry;
use clap::Args;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct EntryArgs {
    /// Paper identifiers (YYMM.NNNNN)
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Write each entry to `<DIR>/<id>.tex` instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: EntryArgs, config: &Config) -> Result<()> {
    let source = super::open_source(config)?;
    if let Some(dir) = &args.output {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let output = args.output.as_deref();

    // One-shot lookup for a single id; shared context otherwise
    if let [id] = args.ids.as_slice() {
        let entry = source.load_entry(id)?;
        return emit(&entry, output);
    }

    let missing = source.with_context(|ctx| {
        let mut missing = 0usize;
        for id in &args.ids {
            match ctx.load_entry(id) {
                Ok(entry) => emit(&entry, output)?,
                Err(e) if e.is_not_found() => {
                    log::warn!("{e}");
                    missing += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok::<_, anyhow::Error>(missing)
    })?;

    log::info!(
        "Extracted {} of {} entries",
        args.ids.len() - missing,
        args.ids.len()
    );
    if missing > 0 {
        anyhow::bail!("{missing} of {} entries not found", args.ids.len());
    }
    Ok(())
}

fn emit(entry: &Entry, output: Option<&Path>) -> Result<()> {
    let contents = entry
        .contents()
        .with_context(|| format!("entry {} has no text contents", entry.id()))?;

    match output {
        Some(dir) => {
            let path = dir.join(format!("{}.tex", entry.id()));
            std::fs::write(&path, contents)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("{} -> {}", entry.id(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(contents.as_bytes())?;
            if !contents.ends_with('\n') {
                writeln!(stdout)?;
            }
        }
    }
    Ok(())
}
