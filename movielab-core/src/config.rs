//! TOML configuration.
//!
//! Every section and field has a default, so an empty file (or no file at
//! all) is a valid configuration.

use crate::data::{DEFAULT_MAX_PAGES_PER_YEAR, TMDB_BASE_URL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable consulted when `api.api_key` is empty.
pub const API_KEY_ENV: &str = "TMDB_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovieLabConfig {
    pub api: ApiConfig,
    pub fetch: FetchConfig,
    pub cache: CacheConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub start_year: i32,
    pub end_year: i32,
    pub max_pages_per_year: u32,
    pub page_delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub top_n: usize,
    pub top_genres: usize,
    pub min_budget: f64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: TMDB_BASE_URL.to_string(),
            api_key: String::new(),
            timeout_secs: 30,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            start_year: 2015,
            end_year: 2024,
            max_pages_per_year: DEFAULT_MAX_PAGES_PER_YEAR,
            page_delay_ms: 250,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { dir: "data".into() }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: 15,
            top_genres: 10,
            min_budget: 1_000_000.0,
        }
    }
}

impl MovieLabConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// The configured API key, else `$TMDB_API_KEY`.
    pub fn api_key(&self) -> Option<String> {
        if !self.api.api_key.trim().is_empty() {
            return Some(self.api.api_key.trim().to_string());
        }
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.fetch.page_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }
}
