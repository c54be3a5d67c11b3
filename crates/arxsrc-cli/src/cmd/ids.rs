//! `arxsrc ids` - list the papers in a shard

use anyhow::Result;
use clap::Args;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct IdsArgs {
    /// Shard filename, e.g. arXiv_src_2101_001.tar
    pub shard: String,
}

pub fn run(args: IdsArgs, config: &Config) -> Result<()> {
    let source = super::open_source(config)?;
    let ids = source.list_shard(&args.shard)?;
    for id in &ids {
        println!("{id}");
    }
    log::info!("{}: {} members", args.shard, arxsrc_core::fmt_num(ids.len()));
    Ok(())
}
