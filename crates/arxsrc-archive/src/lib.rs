//! arxsrc Archive - Access to the arXiv bulk source archive
//!
//! The archive is a directory of `arXiv_src_{yymm}_{seq}.tar` shards plus
//! `arXiv_src_manifest.xml`, which maps identifier ranges to shards. This
//! crate resolves an identifier to its shard, unpacks the shard into a
//! temporary root, and decompresses the paper's member.
//!
//! # Example
//!
//! ```ignore
//! use arxsrc_archive::ArxivDataSource;
//!
//! let source = ArxivDataSource::open("/data/arxiv/src")?;
//!
//! // One-shot: unpack, read, clean up
//! let entry = source.load_entry("2101.00001")?;
//!
//! // Batched: shards stay unpacked until the context closes
//! source.with_context(|ctx| {
//!     for id in ["2101.00001", "2101.00002"] {
//!         println!("{}", ctx.load_entry(id)?.contents().unwrap_or_default().len());
//!     }
//!     Ok::<_, arxsrc_archive::ArchiveError>(())
//! })?;
//! ```

pub mod context;
pub mod entry;
pub mod error;
pub mod extract;
pub mod id;
pub mod manifest;
pub mod shard;
pub mod source;
pub mod temp;

// Re-exports
pub use context::WorkingContext;
pub use entry::{Entry, GzipEntry};
pub use error::{ArchiveError, ErrorKind};
pub use extract::{Extractor, ExtractorKind, NativeTar, SystemTar};
pub use id::ArxivId;
pub use manifest::{MANIFEST_FILENAME, Manifest, ManifestEntry};
pub use shard::Shard;
pub use source::{ArxivDataSource, EntrySource, SourceConfig};
pub use temp::TempRoot;
