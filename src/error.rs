//! Error types for the matching pipeline.
//!
//! Adapters attach an [`ErrorKind`] to every failure at the point it is raised,
//! so retry decisions never depend on message text.

use crate::config::ConfigurationError;
use crate::state_machine::{PipelineStage, PipelineStageState, StateMachineError};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Closed classification of adapter failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Transient failure (rate limiting, timeout) - worth another attempt
    Retryable,
    /// Permanent failure - retrying cannot help
    Fatal,
}

impl ErrorKind {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Retryable => write!(f, "retryable"),
            Self::Fatal => write!(f, "fatal"),
        }
    }
}

/// Failures raised by external stage collaborators
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    #[error("{service} rate limited the request")]
    RateLimited {
        service: String,
        retry_after_ms: Option<u64>,
    },

    #[error("{service} timed out after {elapsed_ms}ms")]
    Timeout { service: String, elapsed_ms: u64 },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Malformed response from {service}: {reason}")]
    Malformed { service: String, reason: String },

    #[error("{service} failed: {reason}")]
    Upstream { service: String, reason: String },
}

impl AdapterError {
    pub fn rate_limited(service: impl Into<String>) -> Self {
        Self::RateLimited {
            service: service.into(),
            retry_after_ms: None,
        }
    }

    pub fn timeout(service: impl Into<String>, elapsed_ms: u64) -> Self {
        Self::Timeout {
            service: service.into(),
            elapsed_ms,
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn malformed(service: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            service: service.into(),
            reason: reason.into(),
        }
    }

    pub fn upstream(service: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Upstream {
            service: service.into(),
            reason: reason.into(),
        }
    }

    /// Kind attached at construction; never derived from the message
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RateLimited { .. } | Self::Timeout { .. } => ErrorKind::Retryable,
            Self::NotFound { .. } | Self::Malformed { .. } | Self::Upstream { .. } => {
                ErrorKind::Fatal
            }
        }
    }
}

/// State captured when a run observes its cancellation signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancellationReport {
    /// Stage that was about to start (or was running) when cancellation was seen
    pub stage: PipelineStage,
    /// Stage states at the moment the run stopped
    pub stages: Vec<PipelineStageState>,
    /// Run log up to the cancellation
    pub log: Vec<String>,
}

/// Top-level failures of a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Discovery itself failed after retries; distinct from "zero candidates"
    #[error("Discovery failed: {0}")]
    Discovery(#[source] AdapterError),

    #[error("Pipeline cancelled during {} stage", .0.stage)]
    Cancelled(Box<CancellationReport>),

    #[error("Invalid evidence profile: {reason}")]
    InvalidProfile { reason: String },

    #[error("Invalid run options: {reason}")]
    InvalidOptions { reason: String },

    #[error("Stage state transition error: {0}")]
    StateTransition(#[from] StateMachineError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl PipelineError {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    pub fn cancellation_report(&self) -> Option<&CancellationReport> {
        match self {
            Self::Cancelled(report) => Some(report),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_error_kinds() {
        assert_eq!(
            AdapterError::rate_limited("extraction").kind(),
            ErrorKind::Retryable
        );
        assert_eq!(
            AdapterError::timeout("discovery", 30_000).kind(),
            ErrorKind::Retryable
        );
        assert_eq!(AdapterError::not_found("NCT000").kind(), ErrorKind::Fatal);
        assert_eq!(
            AdapterError::malformed("extraction", "missing inclusion list").kind(),
            ErrorKind::Fatal
        );
        assert_eq!(
            AdapterError::upstream("summarization", "quota exhausted").kind(),
            ErrorKind::Fatal
        );
    }

    #[test]
    fn test_kind_ignores_message_text() {
        // A fatal error whose text happens to mention a timeout stays fatal
        let error = AdapterError::upstream("extraction", "request timeout (rate limit)");
        assert_eq!(error.kind(), ErrorKind::Fatal);
    }

    #[test]
    fn test_cancellation_is_distinct() {
        let report = CancellationReport {
            stage: PipelineStage::Extraction,
            stages: Vec::new(),
            log: Vec::new(),
        };
        let cancelled = PipelineError::Cancelled(Box::new(report));
        assert!(cancelled.is_cancellation());
        assert_eq!(
            cancelled.to_string(),
            "Pipeline cancelled during extraction stage"
        );

        let discovery = PipelineError::Discovery(AdapterError::not_found("registry"));
        assert!(!discovery.is_cancellation());
        assert!(discovery.cancellation_report().is_none());
    }
}
