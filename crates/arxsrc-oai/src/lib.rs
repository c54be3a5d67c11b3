//! arxsrc OAI - arXiv OAI-PMH metadata harvester
//!
//! `GetRecord` for single papers and a lazily paged `ListRecords`
//! iterator that follows resumption tokens.

pub mod client;
pub mod config;
pub mod record;

// Re-exports
pub use client::{ListRecords, ListRequest, OaiClient, oai_identifier};
pub use config::{OaiConfig, PAGING_BACKOFF};
pub use record::{ListPage, MetadataPrefix, OaiMetadata, parse_get_record, parse_list_records};
