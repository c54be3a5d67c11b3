//! Configuration loading from TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use arxsrc_archive::{ExtractorKind, SourceConfig, TempRoot};
use arxsrc_oai::OaiConfig;
use arxsrc_semantic_scholar::S2Config;
use serde::Deserialize;

/// Global configuration for arxsrc
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub archive: ArchiveSection,
    pub semantic_scholar: SemanticScholarSection,
    pub oai: OaiSection,
    pub http: HttpSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArchiveSection {
    /// Directory holding the manifest and shards
    pub root: Option<PathBuf>,
    pub temp_dir: PathBuf,
    #[serde(deserialize_with = "deserialize_extractor")]
    pub extractor: ExtractorKind,
}

impl Default for ArchiveSection {
    fn default() -> Self {
        Self {
            root: None,
            temp_dir: TempRoot::default().path().to_path_buf(),
            extractor: ExtractorKind::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SemanticScholarSection {
    pub api_url: String,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub api_key: Option<String>,
}

impl Default for SemanticScholarSection {
    fn default() -> Self {
        let defaults = S2Config::default();
        Self {
            api_url: defaults.api_url,
            api_key: defaults.api_key,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OaiSection {
    pub url: String,
    pub paging_backoff_secs: u64,
}

impl Default for OaiSection {
    fn default() -> Self {
        let defaults = OaiConfig::default();
        Self {
            url: defaults.url,
            paging_backoff_secs: defaults.paging_backoff.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    /// Seconds
    pub request_timeout: u64,
    pub max_retries: u32,
}

impl Default for HttpSection {
    fn default() -> Self {
        let defaults = arxsrc_core::HttpConfig::default();
        Self {
            request_timeout: defaults.request_timeout.as_secs(),
            max_retries: defaults.max_retries,
        }
    }
}

fn deserialize_extractor<'de, D>(deserializer: D) -> Result<ExtractorKind, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
}

/// Deserialize a string that may contain environment variable reference like ${VAR}
fn deserialize_env_var<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| expand_env_var(&s)))
}

/// Expand ${VAR} to environment variable value
fn expand_env_var(s: &str) -> Option<String> {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).ok()
    } else {
        Some(s.to_string())
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./arxsrc.toml (current directory)
    /// 2. ~/.config/arxsrc/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("arxsrc.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "arxsrc") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn source_config(&self) -> SourceConfig {
        SourceConfig {
            temp_root: TempRoot::new(&self.archive.temp_dir),
            extractor: self.archive.extractor,
        }
    }

    pub fn s2_config(&self) -> S2Config {
        S2Config {
            api_url: self.semantic_scholar.api_url.clone(),
            api_key: self.semantic_scholar.api_key.clone(),
        }
    }

    pub fn oai_config(&self) -> OaiConfig {
        OaiConfig {
            url: self.oai.url.clone(),
            paging_backoff: Duration::from_secs(self.oai.paging_backoff_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.archive.root.is_none());
        assert!(config.archive.temp_dir.ends_with("arxiv"));
        assert_eq!(config.archive.extractor, ExtractorKind::System);
        assert_eq!(config.oai.paging_backoff_secs, 4);
        assert_eq!(config.http.max_retries, 3);
    }

    #[test]
    fn expand_env_var_simple() {
        std::env::set_var("ARXSRC_TEST_VAR", "test_value");
        assert_eq!(
            expand_env_var("${ARXSRC_TEST_VAR}"),
            Some("test_value".to_string())
        );
        std::env::remove_var("ARXSRC_TEST_VAR");
    }

    #[test]
    fn expand_env_var_literal() {
        assert_eq!(expand_env_var("literal"), Some("literal".to_string()));
    }

    #[test]
    fn expand_env_var_missing() {
        assert_eq!(expand_env_var("${NONEXISTENT_VAR_12345}"), None);
    }

    #[test]
    fn parse_config_toml() {
        let toml = r#"
[archive]
root = "/data/arxiv/src"
temp_dir = "/scratch/arxiv"
extractor = "native"

[oai]
paging_backoff_secs = 10

[http]
request_timeout = 120
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.archive.root, Some(PathBuf::from("/data/arxiv/src")));
        assert_eq!(config.archive.extractor, ExtractorKind::Native);
        assert_eq!(config.http.request_timeout, 120);
        assert_eq!(config.http.max_retries, 3);

        let source = config.source_config();
        assert_eq!(source.temp_root.path(), Path::new("/scratch/arxiv"));
        assert_eq!(config.oai_config().paging_backoff, Duration::from_secs(10));
    }

    #[test]
    fn unknown_extractor_rejected() {
        let toml = "[archive]\nextractor = \"7z\"\n";
        let err = toml::from_str::<Config>(toml).unwrap_err();
        assert!(err.to_string().contains("unknown extractor"));
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("arxsrc.toml");
        std::fs::write(&path, "[semantic_scholar]\napi_key = \"k\"\n").unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.s2_config().api_key.as_deref(), Some("k"));
        assert!(Config::from_file(&dir.path().join("missing.toml")).is_err());
    }
}
