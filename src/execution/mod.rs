//! # Execution Primitives
//!
//! Bounded fan-out used inside the parallel pipeline stages and the
//! cooperative cancellation flag shared with callers.

pub mod batch_runner;
pub mod cancellation;

pub use batch_runner::{
    BatchError, BatchItem, BatchOutcome, BatchProgress, BatchRunner, ItemFailure, ItemResult,
};
pub use cancellation::CancellationToken;
