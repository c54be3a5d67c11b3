//! `arxsrc resolve` - show the shard holding a paper

use anyhow::Result;
use clap::Args;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Paper identifier (YYMM.NNNNN)
    pub id: String,
}

pub fn run(args: ResolveArgs, config: &Config) -> Result<()> {
    let source = super::open_source(config)?;
    let shard = source.shard_for(&args.id)?;
    if !shard.path().is_file() {
        log::warn!("{} is listed in the manifest but missing on disk", shard.name());
    }
    println!("{}", shard.path().display());
    Ok(())
}
