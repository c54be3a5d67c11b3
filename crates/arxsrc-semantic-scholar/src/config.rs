//! Semantic Scholar client configuration

/// Runtime configuration for metadata lookups
#[derive(Debug, Clone)]
pub struct S2Config {
    /// Base URL of the v1 graph API
    pub api_url: String,
    /// Optional key, sent as `x-api-key`
    pub api_key: Option<String>,
}

impl Default for S2Config {
    fn default() -> Self {
        Self {
            api_url: "https://api.semanticscholar.org/v1/".to_string(),
            api_key: std::env::var("S2_API_KEY").ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = S2Config::default();
        assert!(config.api_url.starts_with("https://"));
        assert!(config.api_url.ends_with("/v1/"));
    }
}
