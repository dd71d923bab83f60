//! # Resilience Module
//!
//! Fault tolerance for calls into external stage collaborators. Failures carry
//! an [`ErrorKind`](crate::error::ErrorKind) assigned by the adapter that
//! raised them; only retryable failures are attempted again.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use trial_match_core::error::AdapterError;
//! use trial_match_core::resilience::{RetryExecutor, RetryPolicy};
//!
//! # async fn example() -> Result<(), AdapterError> {
//! let executor = RetryExecutor::new(RetryPolicy::new(3, Duration::from_millis(500)));
//!
//! let criteria_count = executor
//!     .execute("extraction", |_attempt| async {
//!         Ok::<usize, AdapterError>(12)
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod retry;

pub use retry::{Classify, RetryExecutor, RetryPolicy};
