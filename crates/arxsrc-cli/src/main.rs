//! arxsrc - Command-line access to the arXiv bulk source archive
//!
//! Looks up paper sources in a local copy of the archive, and fetches
//! metadata from Semantic Scholar and the arXiv OAI-PMH endpoint.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "arxsrc")]
#[command(about = "Read paper sources from the arXiv bulk source archive")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./arxsrc.toml or ~/.config/arxsrc/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Archive root (directory holding arXiv_src_manifest.xml)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    request_timeout: Option<u64>,

    /// Maximum retry attempts for transient failures
    #[arg(long, global = true)]
    max_retries: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
    /// Print (or save) the source of one or more papers
    Entry(cmd::entry::EntryArgs),
    /// Show which shard holds a paper
    Resolve(cmd::resolve::ResolveArgs),
    /// List the papers in a shard
    Ids(cmd::ids::IdsArgs),
    /// Summarize the manifest by month
    Manifest,
    /// Remove everything under the temporary root
    Clean,
    /// Show Semantic Scholar metadata for a paper
    Paper(cmd::paper::PaperArgs),
    /// Fetch one record from the OAI-PMH endpoint
    Record(cmd::harvest::RecordArgs),
    /// Harvest OAI-PMH records as JSON lines
    Harvest(cmd::harvest::HarvestArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let progress = Arc::new(arxsrc_core::ProgressContext::new());

    // TTY: warnings only unless --debug, progress bars show activity.
    // Non-TTY: info, logs are the only progress indicator.
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = if is_tty { !cli.debug } else { false };
    arxsrc_core::init_logging(quiet, cli.debug, multi);

    let mut config = if let Some(path) = &cli.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };
    if let Some(root) = cli.root {
        config.archive.root = Some(root);
    }

    arxsrc_core::set_http_config(arxsrc_core::HttpConfig {
        request_timeout: std::time::Duration::from_secs(
            cli.request_timeout.unwrap_or(config.http.request_timeout),
        ),
        max_retries: cli.max_retries.unwrap_or(config.http.max_retries),
    });

    match cli.command {
        Command::Entry(args) => cmd::entry::run(args, &config),
        Command::Resolve(args) => cmd::resolve::run(args, &config),
        Command::Ids(args) => cmd::ids::run(args, &config),
        Command::Manifest => cmd::manifest::run(&config),
        Command::Clean => cmd::clean::run(&config),
        Command::Paper(args) => cmd::paper::run(args, &config),
        Command::Record(args) => cmd::harvest::record(args, &config),
        Command::Harvest(args) => cmd::harvest::run(args, &config, &progress),
        Command::Config => {
            cmd::show_config(&config);
            Ok(())
        }
    }
}
