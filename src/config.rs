//! Search configuration
//!
//! Loaded from a TOML file such as:
//!
//! ```toml
//! concurrency_ceiling = 20
//! default_page_size = 100
//! per_repo_timeout_ms = 5000
//!
//! [logging]
//! level = "info"
//! ```
//!
//! Missing keys fall back to their defaults; a missing file yields the default
//! configuration.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};
use crate::pagination::DEFAULT_PAGE_SIZE;

/// Default number of repositories searched concurrently
pub const DEFAULT_CONCURRENCY_CEILING: usize = 20;

/// Default time budget for one repository
pub const DEFAULT_PER_REPO_TIMEOUT: Duration = Duration::from_secs(5);

/// Options supplied to the orchestrator at construction time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum number of repositories searched at once
    #[serde(default = "default_concurrency_ceiling")]
    pub concurrency_ceiling: usize,

    /// Page size for listings when the caller gives none
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Time budget for a single repository
    #[serde(
        default = "default_per_repo_timeout",
        rename = "per_repo_timeout_ms",
        with = "duration_ms"
    )]
    pub per_repo_timeout: Duration,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_concurrency_ceiling() -> usize {
    DEFAULT_CONCURRENCY_CEILING
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_per_repo_timeout() -> Duration {
    DEFAULT_PER_REPO_TIMEOUT
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            concurrency_ceiling: default_concurrency_ceiling(),
            default_page_size: default_page_size(),
            per_repo_timeout: default_per_repo_timeout(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl SearchConfig {
    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate TOML configuration text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| SearchError::ConfigError {
            message: format!("Failed to parse config: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the search core cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.concurrency_ceiling == 0 {
            return Err(SearchError::ConfigError {
                message: "concurrency_ceiling must be at least 1".to_string(),
            });
        }
        if self.default_page_size == 0 {
            return Err(SearchError::ConfigError {
                message: "default_page_size must be at least 1".to_string(),
            });
        }
        if self.per_repo_timeout.is_zero() {
            return Err(SearchError::ConfigError {
                message: "per_repo_timeout_ms must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    pub fn with_concurrency_ceiling(mut self, ceiling: usize) -> Self {
        self.concurrency_ceiling = ceiling;
        self
    }

    pub fn with_per_repo_timeout(mut self, timeout: Duration) -> Self {
        self.per_repo_timeout = timeout;
        self
    }

    pub fn with_default_page_size(mut self, size: usize) -> Self {
        self.default_page_size = size;
        self
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
