//! OAI-PMH endpoint configuration

use std::time::Duration;

/// Minimum spacing between paged `ListRecords` requests. arXiv asks
/// harvesters to wait a few seconds between resumption requests.
pub const PAGING_BACKOFF: Duration = Duration::from_secs(4);

#[derive(Debug, Clone)]
pub struct OaiConfig {
    /// Repository base URL
    pub url: String,
    /// Wait between pages, measured from the end of the previous response
    pub paging_backoff: Duration,
}

impl Default for OaiConfig {
    fn default() -> Self {
        Self {
            url: "https://export.arxiv.org/oai2".to_string(),
            paging_backoff: PAGING_BACKOFF,
        }
    }
}
