//! arxsrc Semantic Scholar - Paper metadata lookup
//!
//! Fetches title/author/year metadata for arXiv papers from the Semantic
//! Scholar v1 API and pairs it with full text from the source archive.
//!
//! # Example
//!
//! ```ignore
//! use arxsrc_archive::ArxivDataSource;
//! use arxsrc_semantic_scholar::{Paper, S2Config};
//!
//! let mut source = ArxivDataSource::open("/data/arxiv/src")?;
//! let paper = Paper::fetch("1605.00001", &S2Config::default())?;
//! println!("{}: {} bytes", paper.title(), paper.load_full_text(&mut source)?.len());
//! ```

pub mod api;
pub mod config;
pub mod paper;
pub mod schema;

// Re-exports
pub use api::{fetch_metadata, url_join};
pub use config::S2Config;
pub use paper::Paper;
pub use schema::{Author, PaperMetadata};
