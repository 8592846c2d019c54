//! Worker pool draining the work queue
//!
//! `width` tokio tasks each loop: take one URL, fetch it, record the outcome,
//! until the queue is empty. The pool returns once every worker has
//! observed the empty queue.

use crate::crawler::failures::FailureTracker;
use crate::crawler::fetcher::{fetch_document, Fetcher};
use crate::crawler::queue::WorkQueue;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

/// Log a progress line every this many fetched documents
const PROGRESS_INTERVAL: usize = 100;

/// Statistics of a main pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Number of workers spawned
    pub workers: usize,

    /// Documents fetched (successfully or not)
    pub fetched: usize,

    /// Documents recorded as failures
    pub failed: usize,

    /// Wall-clock duration of the pass
    pub elapsed: Duration,

    /// Sum of individual fetch durations across workers
    pub busy: Duration,
}

impl PoolStats {
    /// Average duration of a single fetch
    pub fn average_fetch(&self) -> Option<Duration> {
        let fetched = u32::try_from(self.fetched).ok().filter(|n| *n > 0)?;
        Some(self.busy / fetched)
    }
}

/// What one worker did before it saw the empty queue
#[derive(Debug, Default)]
struct WorkerReport {
    fetched: usize,
    failed: usize,
    busy: Duration,
}

/// Runs the worker pool to completion
///
/// # Arguments
///
/// * `queue` - Documents to fetch; drained to empty
/// * `fetcher` - Shared transport
/// * `tracker` - Receives one failure per failed document
/// * `width` - Maximum number of concurrent fetches
///
/// Fewer than `width` workers are spawned when the queue is shorter than
/// `width`. A worker that panics is logged; the URL it held is lost but the
/// remaining workers keep draining the queue.
pub async fn run_pool<F: Fetcher>(
    queue: Arc<WorkQueue>,
    fetcher: Arc<F>,
    tracker: Arc<FailureTracker>,
    width: usize,
) -> PoolStats {
    let total = queue.len();
    let workers = width.max(1).min(total);
    let progress = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    tracing::debug!("Spawning {} workers for {} documents", workers, total);

    let mut join_set = JoinSet::new();
    for worker_id in 0..workers {
        let queue = Arc::clone(&queue);
        let fetcher = Arc::clone(&fetcher);
        let tracker = Arc::clone(&tracker);
        let progress = Arc::clone(&progress);

        join_set.spawn(async move {
            worker_loop(worker_id, &queue, fetcher.as_ref(), &tracker, &progress, total).await
        });
    }

    let mut stats = PoolStats {
        workers,
        ..PoolStats::default()
    };

    while let Some(result) = join_set.join_next().await {
        match result {
            Ok(report) => {
                stats.fetched += report.fetched;
                stats.failed += report.failed;
                stats.busy += report.busy;
            }
            Err(join_error) => {
                tracing::error!("Worker panicked: {}", join_error);
            }
        }
    }

    stats.elapsed = start.elapsed();
    stats
}

async fn worker_loop<F: Fetcher>(
    worker_id: usize,
    queue: &WorkQueue,
    fetcher: &F,
    tracker: &FailureTracker,
    progress: &AtomicUsize,
    total: usize,
) -> WorkerReport {
    let mut report = WorkerReport::default();

    while let Some(url) = queue.take() {
        let started = Instant::now();
        let outcome = fetch_document(fetcher, &url, tracker).await;
        report.busy += started.elapsed();
        report.fetched += 1;
        if !outcome.is_success() {
            report.failed += 1;
        }

        let done = progress.fetch_add(1, Ordering::Relaxed) + 1;
        if done % PROGRESS_INTERVAL == 0 {
            tracing::info!("Progress: {}/{} documents fetched", done, total);
        }
    }

    tracing::trace!("Worker {} done after {} fetches", worker_id, report.fetched);
    report
}
