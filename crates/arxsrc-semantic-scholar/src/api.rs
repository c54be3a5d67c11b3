//! Semantic Scholar API client

use anyhow::Context;
use arxsrc_core::{get_text, retry_with_backoff};

use crate::config::S2Config;
use crate::schema::PaperMetadata;

/// Join URL parts with exactly one `/` between them.
///
/// ```
/// use arxsrc_semantic_scholar::url_join;
/// assert_eq!(
///     url_join(["https://api.example.org/", "/v1/", "paper"]),
///     "https://api.example.org/v1/paper"
/// );
/// ```
pub fn url_join<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut url = String::new();
    for (i, part) in parts.into_iter().enumerate() {
        let part = part.as_ref();
        if i == 0 {
            url.push_str(part.trim_end_matches('/'));
        } else {
            url.push('/');
            url.push_str(part.trim_matches('/'));
        }
    }
    url
}

/// Endpoint for an arXiv paper.
pub fn paper_url(api_url: &str, arxiv_id: &str) -> String {
    url_join([api_url, format!("paper/arXiv:{arxiv_id}").as_str()])
}

/// Fetch metadata for an arXiv paper.
///
/// Retries rate limits and server errors; any other failure means the
/// entry is inaccessible.
pub fn fetch_metadata(config: &S2Config, arxiv_id: &str) -> anyhow::Result<PaperMetadata> {
    let url = paper_url(&config.api_url, arxiv_id);
    let headers: Vec<(&str, &str)> = config
        .api_key
        .as_deref()
        .map(|key| ("x-api-key", key))
        .into_iter()
        .collect();

    log::debug!("Fetching Semantic Scholar metadata for arXiv:{arxiv_id}");
    let body = retry_with_backoff(&format!("S2 arXiv:{arxiv_id}"), || {
        get_text(&url, &[], &headers)
    })
    .map_err(|e| anyhow::anyhow!("Semantic Scholar entry arXiv:{arxiv_id} inaccessible: {e}"))?;

    serde_json::from_str(&body)
        .with_context(|| format!("Unexpected Semantic Scholar response for arXiv:{arxiv_id}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_join_collapses_slashes() {
        assert_eq!(
            url_join(["https://omnilabs.ai/", "/api/", "/v1/", "/users/"]),
            "https://omnilabs.ai/api/v1/users"
        );
    }

    #[test]
    fn url_join_plain_parts() {
        assert_eq!(
            url_join(["https://omnilabs.ai", "api", "v1", "users"]),
            "https://omnilabs.ai/api/v1/users"
        );
    }

    #[test]
    fn url_join_single_part() {
        assert_eq!(url_join(["https://example.org/"]), "https://example.org");
    }

    #[test]
    fn paper_url_format() {
        assert_eq!(
            paper_url("https://api.semanticscholar.org/v1/", "2101.00001"),
            "https://api.semanticscholar.org/v1/paper/arXiv:2101.00001"
        );
    }

    /// Requires network access.
    /// Run with: cargo test -p arxsrc-semantic-scholar -- --ignored fetch_real_paper
    #[test]
    #[ignore]
    fn fetch_real_paper() {
        let meta = fetch_metadata(&S2Config::default(), "1706.03762").unwrap();
        assert_eq!(meta.arxiv_id, "1706.03762");
        assert!(meta.title.contains("Attention"));
    }
}
