//! # Matcher Configuration
//!
//! Validated, environment-aware configuration for pipeline runs. Values are
//! layered with the `config` crate: built-in defaults, then
//! `matcher.yaml`, then `matcher.<environment>.yaml`, then `MATCHER__*`
//! environment variables.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use trial_match_core::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let max_candidates = manager.config().pipeline.max_candidates;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use crate::constants::defaults;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MatcherConfig {
    pub pipeline: PipelineConfig,
    pub retry: RetryConfig,
    pub discovery: DiscoveryConfig,
    pub logging: LoggingConfig,
}

/// Per-run caps and concurrency ceilings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Candidates kept after Discovery
    pub max_candidates: usize,
    pub extraction_concurrency: usize,
    pub matching_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_candidates: defaults::MAX_CANDIDATES,
            extraction_concurrency: defaults::EXTRACTION_CONCURRENCY,
            matching_concurrency: defaults::MATCHING_CONCURRENCY,
        }
    }
}

/// Retry behaviour for adapter calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for each attempt after that
    pub base_delay_ms: u64,
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: defaults::RETRY_MAX_ATTEMPTS,
            base_delay_ms: defaults::RETRY_BASE_DELAY_MS,
        }
    }
}

/// Filters applied to Discovery output before Extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Accepted recruiting statuses, compared after normalisation
    pub eligible_statuses: Vec<String>,
    /// Drop candidates whose nearest known site is beyond the profile's radius
    pub enforce_travel_radius: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            eligible_statuses: defaults::ELIGIBLE_STATUSES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            enforce_travel_radius: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: PathBuf,
    /// Write JSON logs to a file in `directory` as well as the console
    pub file_output: bool,
    /// Overrides the environment's default level when set
    pub level: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("log"),
            file_output: true,
            level: None,
        }
    }
}

impl MatcherConfig {
    /// Reject values that would make a run impossible
    pub fn validate(&self) -> ConfigResult<()> {
        if self.pipeline.max_candidates == 0 {
            return Err(ConfigurationError::invalid_value(
                "pipeline.max_candidates",
                "0",
                "at least one candidate must be processed",
            ));
        }
        if self.pipeline.extraction_concurrency == 0 {
            return Err(ConfigurationError::invalid_value(
                "pipeline.extraction_concurrency",
                "0",
                "concurrency must be at least 1",
            ));
        }
        if self.pipeline.matching_concurrency == 0 {
            return Err(ConfigurationError::invalid_value(
                "pipeline.matching_concurrency",
                "0",
                "concurrency must be at least 1",
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigurationError::invalid_value(
                "retry.max_attempts",
                "0",
                "the first attempt counts, so the minimum is 1",
            ));
        }
        if self
            .discovery
            .eligible_statuses
            .iter()
            .all(|status| status.trim().is_empty())
        {
            return Err(ConfigurationError::invalid_value(
                "discovery.eligible_statuses",
                format!("{:?}", self.discovery.eligible_statuses),
                "at least one recruiting status must be accepted",
            ));
        }
        if let Some(level) = &self.logging.level {
            if level.trim().is_empty() {
                return Err(ConfigurationError::invalid_value(
                    "logging.level",
                    level.clone(),
                    "log level must not be blank",
                ));
            }
        }
        Ok(())
    }
}
