//! `arxsrc record` / `arxsrc harvest` - OAI-PMH metadata

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use arxsrc_core::{SharedProgress, fmt_num};
use arxsrc_oai::{ListRequest, MetadataPrefix, OaiClient};
use chrono::NaiveDate;
use clap::Args;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct RecordArgs {
    /// Paper identifier or full OAI identifier
    pub id: String,

    /// Metadata format (oai_dc or arXiv)
    #[arg(long, default_value = "oai_dc")]
    pub prefix: MetadataPrefix,
}

#[derive(Args, Debug)]
pub struct HarvestArgs {
    /// First datestamp (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub from: NaiveDate,

    /// Last datestamp (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub until: NaiveDate,

    /// Restrict to a set, e.g. cs or physics:astro-ph
    #[arg(long)]
    pub set: Option<String>,

    /// Metadata format (oai_dc or arXiv)
    #[arg(long, default_value = "oai_dc")]
    pub prefix: MetadataPrefix,

    /// Write JSON lines here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn record(args: RecordArgs, config: &Config) -> Result<()> {
    let client = OaiClient::new(config.oai_config());
    let record = client.get_record(&args.id, args.prefix)?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

pub fn run(args: HarvestArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    if args.from > args.until {
        anyhow::bail!("--from {} is after --until {}", args.from, args.until);
    }

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };

    let client = OaiClient::new(config.oai_config());
    let request = ListRequest {
        from: args.from,
        until: args.until,
        set: args.set,
        prefix: args.prefix,
    };
    log::info!(
        "Harvesting {} to {} ({}{})",
        request.from,
        request.until,
        request.prefix,
        request
            .set
            .as_deref()
            .map(|s| format!(", set {s}"))
            .unwrap_or_default()
    );

    let pb = progress.stage_line("harvest");
    let mut records = client.list_records(request, Some(pb.clone()));
    let mut count = 0usize;
    for record in records.by_ref() {
        let record = record?;
        serde_json::to_writer(&mut out, &record)?;
        out.write_all(b"\n")?;
        count += 1;
    }
    out.flush()?;
    pb.finish_and_clear();

    progress.println(format!(
        "Harvested {} records in {} pages",
        fmt_num(count),
        records.pages()
    ));
    Ok(())
}
