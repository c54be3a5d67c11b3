//! arxsrc Core - Shared infrastructure for arXiv source tooling
//!
//! Logging, progress reporting, and the blocking HTTP layer used by the
//! metadata and harvesting crates.

pub mod http;
pub mod logging;
pub mod progress;
pub mod retry;

// Re-exports for convenience
pub use http::{
    HttpConfig, HttpError, SHARED_RUNTIME, get_text, http_client, http_config, set_http_config,
};
pub use logging::{IndicatifLogger, init_logging};
pub use progress::{ProgressContext, SharedProgress, fmt_num, upgrade_to_bar};
pub use retry::{backoff_duration, retry_with_backoff};
