//! Scraper configuration loaded from an optional YAML file.
//!
//! Every field has a default, so an empty file (or no file) is valid:
//!
//! ```yaml
//! user_agent: "RosterScout/0.1 (+contact: you@example.com)"
//! timeout_secs: 20
//! max_attempts: 3
//! backoff_base_ms: 1000
//! backoff_max_ms: 8000
//! sport_hint: "men's soccer"
//! schools:
//!   "concordia college": "concordiacobbers.com"
//! ```

use crate::error::{Result, ScrapeError};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub user_agent: String,
    pub accept_language: String,
    /// Whole-request timeout for one HTTP GET.
    pub timeout_secs: u64,
    /// Total attempts per fetch, including the first.
    pub max_attempts: usize,
    pub backoff_base_ms: u64,
    pub backoff_max_ms: u64,
    /// Upper bound of the random jitter added to each backoff.
    pub backoff_jitter_ms: u64,
    /// Free-text sport name appended to external search queries. Derived
    /// from the sport path when unset.
    pub sport_hint: Option<String>,
    /// Extra school → athletics hostname associations, merged over the built-ins.
    pub schools: HashMap<String, String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("RosterScout/", env!("CARGO_PKG_VERSION")).to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            timeout_secs: 20,
            max_attempts: 3,
            backoff_base_ms: 1_000,
            backoff_max_ms: 8_000,
            backoff_jitter_ms: 250,
            sport_hint: None,
            schools: HashMap::new(),
        }
    }
}

impl ScraperConfig {
    /// The configured hint, or the sport path slug with dashes as spaces.
    pub fn sport_hint_for(&self, sport_path: &str) -> String {
        self.sport_hint
            .as_deref()
            .map(str::trim)
            .filter(|hint| !hint.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| sport_path.replace('-', " "))
    }

    /// Load a config file, or the defaults when `path` is `None`.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&str>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = tokio::fs::read_to_string(Path::new(path))
            .await
            .map_err(|source| ScrapeError::ConfigIo {
                path: path.to_string(),
                source,
            })?;
        let config = Self::from_yaml(&raw).map_err(|source| ScrapeError::ConfigParse {
            path: path.to_string(),
            source,
        })?;
        info!(path, schools = config.schools.len(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn backoff_max(&self) -> Duration {
        Duration::from_millis(self.backoff_max_ms)
    }
}
