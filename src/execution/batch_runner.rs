//! # Batch Runner
//!
//! Executes independent per-item operations in sequential chunks of at most
//! `concurrency` items. Every operation in a chunk runs concurrently and the
//! whole chunk settles before the next one starts, so the number of
//! in-flight operations never exceeds the ceiling and progress advances at
//! deterministic chunk boundaries.
//!
//! Per-item failures are recorded and never abort the batch: the caller gets
//! exactly one [`ItemResult`] per input item, in input order.

use super::cancellation::CancellationToken;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;
use tracing::{debug, info};

/// Items that can be identified in failure records
pub trait BatchItem {
    fn batch_key(&self) -> &str;
}

impl BatchItem for String {
    fn batch_key(&self) -> &str {
        self
    }
}

/// A failed item and the error that dropped it
#[derive(Debug, Clone, PartialEq)]
pub struct ItemFailure<E> {
    pub item_id: String,
    pub error: E,
}

/// Settled result for one input item
#[derive(Debug, Clone, PartialEq)]
pub enum ItemResult<T, E> {
    Succeeded { item_id: String, value: T },
    Failed(ItemFailure<E>),
}

impl<T, E> ItemResult<T, E> {
    pub fn item_id(&self) -> &str {
        match self {
            Self::Succeeded { item_id, .. } => item_id,
            Self::Failed(failure) => &failure.item_id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// Progress snapshot emitted after each chunk settles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub chunks_completed: usize,
    pub chunks_total: usize,
}

impl BatchProgress {
    /// Items completed so far over total items
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    /// Fraction as a whole percentage, rounded down
    pub fn percent(&self) -> u8 {
        (self.fraction() * 100.0).floor().clamp(0.0, 100.0) as u8
    }
}

/// Every input item's settled result, in input order
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome<T, E> {
    pub results: Vec<ItemResult<T, E>>,
    pub chunks_completed: usize,
}

impl<T, E> BatchOutcome<T, E> {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn succeeded_count(&self) -> usize {
        self.results.iter().filter(|result| result.is_success()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.len() - self.succeeded_count()
    }

    /// Split into successes and failures, each preserving input order
    pub fn into_parts(self) -> (Vec<(String, T)>, Vec<ItemFailure<E>>) {
        let mut successes = Vec::new();
        let mut failures = Vec::new();
        for result in self.results {
            match result {
                ItemResult::Succeeded { item_id, value } => successes.push((item_id, value)),
                ItemResult::Failed(failure) => failures.push(failure),
            }
        }
        (successes, failures)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    /// Cancellation observed before a chunk started
    #[error("Batch cancelled after {completed} of {total} items")]
    Cancelled { completed: usize, total: usize },
}

/// Chunked, bounded-concurrency executor
#[derive(Debug, Clone, Copy)]
pub struct BatchRunner {
    concurrency: usize,
}

impl BatchRunner {
    /// Create a runner; a zero ceiling is raised to one
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Number of chunks a batch of `total` items is split into
    pub fn chunk_count(&self, total: usize) -> usize {
        total.div_ceil(self.concurrency)
    }

    /// Run `operation` over `items`, reporting progress after every chunk
    ///
    /// Cancellation is checked before each chunk; a cancelled batch discards
    /// the results gathered so far and returns [`BatchError::Cancelled`].
    pub async fn run<I, T, E, F, Fut, P>(
        &self,
        items: Vec<I>,
        cancellation: &CancellationToken,
        operation: F,
        mut on_progress: P,
    ) -> Result<BatchOutcome<T, E>, BatchError>
    where
        I: BatchItem,
        F: Fn(I) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: FnMut(&BatchProgress),
    {
        let total = items.len();
        let chunks_total = self.chunk_count(total);
        let mut results: Vec<ItemResult<T, E>> = Vec::with_capacity(total);
        let mut progress = BatchProgress {
            completed: 0,
            total,
            succeeded: 0,
            failed: 0,
            chunks_completed: 0,
            chunks_total,
        };

        debug!(
            total,
            concurrency = self.concurrency,
            chunks = chunks_total,
            "Starting batch"
        );

        let mut remaining = items.into_iter().peekable();
        while remaining.peek().is_some() {
            if cancellation.is_cancelled() {
                info!(
                    completed = progress.completed,
                    total, "🛑 Batch cancelled before next chunk"
                );
                return Err(BatchError::Cancelled {
                    completed: progress.completed,
                    total,
                });
            }

            let chunk: Vec<I> = remaining.by_ref().take(self.concurrency).collect();
            let settled = join_all(chunk.into_iter().map(|item| {
                let item_id = item.batch_key().to_string();
                let pending = operation(item);
                async move { (item_id, pending.await) }
            }))
            .await;

            for (item_id, result) in settled {
                match result {
                    Ok(value) => {
                        progress.succeeded += 1;
                        results.push(ItemResult::Succeeded { item_id, value });
                    }
                    Err(error) => {
                        progress.failed += 1;
                        results.push(ItemResult::Failed(ItemFailure { item_id, error }));
                    }
                }
            }

            progress.completed = results.len();
            progress.chunks_completed += 1;
            debug!(
                chunk = progress.chunks_completed,
                chunks = chunks_total,
                completed = progress.completed,
                failed = progress.failed,
                "Batch chunk settled"
            );
            on_progress(&progress);
        }

        Ok(BatchOutcome {
            results,
            chunks_completed: progress.chunks_completed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn ids(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("item-{i}")).collect()
    }

    #[tokio::test]
    async fn test_results_follow_input_order() {
        let runner = BatchRunner::new(3);
        let outcome = runner
            .run(
                ids(7),
                &CancellationToken::new(),
                |id: String| async move {
                    // Later items in a chunk finish first
                    let index: u64 = id.trim_start_matches("item-").parse().unwrap();
                    tokio::time::sleep(Duration::from_millis(10 - index)).await;
                    Ok::<String, String>(id.to_uppercase())
                },
                |_| {},
            )
            .await
            .unwrap();

        let order: Vec<&str> = outcome.results.iter().map(|r| r.item_id()).collect();
        assert_eq!(order, ids(7).iter().map(String::as_str).collect::<Vec<_>>());
        assert_eq!(outcome.chunks_completed, 3);
    }

    #[tokio::test]
    async fn test_failures_are_recorded_not_fatal() {
        let runner = BatchRunner::new(2);
        let outcome = runner
            .run(
                ids(5),
                &CancellationToken::new(),
                |id: String| async move {
                    if id == "item-1" || id == "item-4" {
                        Err(format!("{id} failed"))
                    } else {
                        Ok(id.len())
                    }
                },
                |_| {},
            )
            .await
            .unwrap();

        assert_eq!(outcome.len(), 5);
        assert_eq!(outcome.succeeded_count(), 3);
        assert_eq!(outcome.failed_count(), 2);

        let (successes, failures) = outcome.into_parts();
        assert_eq!(successes.len(), 3);
        assert_eq!(failures[0].item_id, "item-1");
        assert_eq!(failures[1].error, "item-4 failed");
    }

    #[tokio::test]
    async fn test_progress_reported_per_chunk() {
        let runner = BatchRunner::new(2);
        let reports = Arc::new(Mutex::new(Vec::new()));
        let sink = reports.clone();

        runner
            .run(
                ids(5),
                &CancellationToken::new(),
                |id: String| async move { Ok::<String, ()>(id) },
                move |progress| sink.lock().push((progress.completed, progress.percent())),
            )
            .await
            .unwrap();

        assert_eq!(*reports.lock(), vec![(2, 40), (4, 80), (5, 100)]);
    }

    #[tokio::test]
    async fn test_concurrency_never_exceeds_ceiling() {
        let runner = BatchRunner::new(3);
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let outcome = runner
            .run(
                ids(10),
                &CancellationToken::new(),
                |id: String| {
                    let in_flight = in_flight.clone();
                    let peak = peak.clone();
                    async move {
                        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(2)).await;
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                        Ok::<String, ()>(id)
                    }
                },
                |_| {},
            )
            .await
            .unwrap();

        assert_eq!(outcome.len(), 10);
        assert_eq!(peak.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_cancellation_checked_between_chunks() {
        let runner = BatchRunner::new(2);
        let token = CancellationToken::new();
        let started = Arc::new(AtomicUsize::new(0));
        let trigger = token.clone();

        let result = runner
            .run(
                ids(6),
                &token,
                |id: String| {
                    let started = started.clone();
                    async move {
                        started.fetch_add(1, Ordering::SeqCst);
                        Ok::<String, ()>(id)
                    }
                },
                move |progress| {
                    if progress.chunks_completed == 1 {
                        trigger.cancel();
                    }
                },
            )
            .await;

        assert_eq!(
            result.unwrap_err(),
            BatchError::Cancelled {
                completed: 2,
                total: 6
            }
        );
        // The first chunk settled, nothing after it started
        assert_eq!(started.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let runner = BatchRunner::new(4);
        let mut reports = 0;
        let outcome = runner
            .run(
                Vec::<String>::new(),
                &CancellationToken::new(),
                |id: String| async move { Ok::<String, ()>(id) },
                |_| reports += 1,
            )
            .await
            .unwrap();
        assert!(outcome.is_empty());
        assert_eq!(reports, 0);
        assert_eq!(runner.chunk_count(0), 0);
    }

    #[test]
    fn test_zero_concurrency_is_raised() {
        assert_eq!(BatchRunner::new(0).concurrency(), 1);
        assert_eq!(BatchRunner::new(3).chunk_count(7), 3);
    }
}
