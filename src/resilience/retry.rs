//! # Retry Executor
//!
//! Bounded retry with exponential backoff for calls into external stage
//! collaborators. Attempts are strictly sequential; the delay after failed
//! attempt `n` (0-based) is `base_delay * 2^n`.

use crate::config::RetryConfig;
use crate::error::{AdapterError, ErrorKind};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Errors that know whether another attempt could succeed
pub trait Classify {
    fn error_kind(&self) -> ErrorKind;
}

impl Classify for AdapterError {
    fn error_kind(&self) -> ErrorKind {
        self.kind()
    }
}

/// Attempt budget and backoff base for one call site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.base_delay_ms),
        )
    }

    /// Single attempt, no backoff
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Wait before the attempt following failed attempt `attempt_index` (0-based)
    pub fn delay_for(&self, attempt_index: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt_index).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

/// Runs an operation under a [`RetryPolicy`]
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Execute `operation`, retrying retryable failures with backoff
    ///
    /// The closure receives the 0-based attempt index. A fatal error, or a
    /// retryable error on the last allowed attempt, is returned immediately.
    pub async fn execute<F, Fut, T, E>(&self, operation_name: &str, mut operation: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Classify + Display,
    {
        let mut attempt_index = 0u32;
        loop {
            match operation(attempt_index).await {
                Ok(value) => {
                    if attempt_index > 0 {
                        debug!(
                            operation = operation_name,
                            attempts = attempt_index + 1,
                            "Operation succeeded after retry"
                        );
                    }
                    return Ok(value);
                }
                Err(error) => {
                    let kind = error.error_kind();
                    let attempts_made = attempt_index + 1;

                    if !kind.is_retryable() {
                        debug!(
                            operation = operation_name,
                            attempt = attempts_made,
                            error = %error,
                            "Fatal error, not retrying"
                        );
                        return Err(error);
                    }

                    if attempts_made >= self.policy.max_attempts {
                        warn!(
                            operation = operation_name,
                            attempts = attempts_made,
                            error = %error,
                            "Retry attempts exhausted"
                        );
                        return Err(error);
                    }

                    let delay = self.policy.delay_for(attempt_index);
                    warn!(
                        operation = operation_name,
                        attempt = attempts_made,
                        max_attempts = self.policy.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "🔁 Retryable error, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt_index += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    fn executor(max_attempts: u32, base_ms: u64) -> RetryExecutor {
        RetryExecutor::new(RetryPolicy::new(
            max_attempts,
            Duration::from_millis(base_ms),
        ))
    }

    #[test]
    fn test_delay_doubles() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100));
        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(800));
    }

    #[test]
    fn test_policy_has_at_least_one_attempt() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result: Result<&str, AdapterError> = executor(3, 10)
            .execute("discovery", |_| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok("found")
                }
            })
            .await;
        assert_eq!(result.unwrap(), "found");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retryable_then_success_waits_backoff() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let started = Instant::now();

        let result: Result<u32, AdapterError> = executor(4, 100)
            .execute("extraction", |attempt| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    if attempt < 2 {
                        Err(AdapterError::rate_limited("extraction"))
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 100ms after attempt 0, 200ms after attempt 1
        assert_eq!(started.elapsed(), Duration::from_millis(300));
    }

    #[tokio::test]
    async fn test_fatal_error_stops_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result: Result<(), AdapterError> = executor(5, 1)
            .execute("extraction", |_| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(AdapterError::not_found("NCT404"))
                }
            })
            .await;

        assert_eq!(result.unwrap_err(), AdapterError::not_found("NCT404"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_returns_last_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result: Result<(), AdapterError> = executor(3, 50)
            .execute("discovery", |attempt| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(AdapterError::timeout("discovery", u64::from(attempt)))
                }
            })
            .await;

        assert_eq!(result.unwrap_err(), AdapterError::timeout("discovery", 2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retryable_then_fatal_stops() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result: Result<(), AdapterError> = executor(5, 10)
            .execute("extraction", |attempt| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    if attempt == 0 {
                        Err(AdapterError::timeout("extraction", 5_000))
                    } else {
                        Err(AdapterError::malformed("extraction", "empty body"))
                    }
                }
            })
            .await;

        assert!(matches!(result, Err(AdapterError::Malformed { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
