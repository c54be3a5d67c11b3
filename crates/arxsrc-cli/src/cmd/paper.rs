//! `arxsrc paper` - Semantic Scholar metadata, optionally with full text

use anyhow::Result;
use arxsrc_semantic_scholar::Paper;
use clap::Args;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct PaperArgs {
    /// Paper identifier (YYMM.NNNNN)
    pub id: String,

    /// Also print the paper's source from the archive
    #[arg(long)]
    pub full_text: bool,
}

pub fn run(args: PaperArgs, config: &Config) -> Result<()> {
    let paper = Paper::fetch(&args.id, &config.s2_config())?;

    let mut t = super::table(&["Field", "Value"]);
    t.add_row(vec!["arXiv", &paper.arxiv_id]);
    t.add_row(vec!["Title", paper.title()]);
    t.add_row(vec!["Year", &paper.meta.year.to_string()]);
    t.add_row(vec!["Authors", &paper.meta.author_names().join(", ")]);
    if let Some(abstract_text) = &paper.meta.abstract_text {
        t.add_row(vec!["Abstract", abstract_text]);
    }
    eprintln!("\n{t}");

    if args.full_text {
        let mut source = super::open_source(config)?;
        println!("{}", paper.load_full_text(&mut source)?);
    }
    Ok(())
}
