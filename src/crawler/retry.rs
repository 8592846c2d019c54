//! Second-chance pass over failed documents

use crate::crawler::failures::FetchFailure;
use crate::crawler::fetcher::{FetchOutcome, Fetcher};

/// Result of the retry pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryStats {
    /// Documents re-fetched
    pub attempted: usize,

    /// Documents that succeeded on retry
    pub recovered: usize,

    /// Documents that failed again, with their latest failure
    pub still_failing: Vec<FetchFailure>,
}

/// Re-fetches every failed document once, one at a time
///
/// Runs sequentially regardless of the main pass's width, to avoid piling
/// onto an origin that is already erroring. Nothing is written back to the
/// failure tracker.
pub async fn retry_failures<F>(fetcher: &F, failures: &[FetchFailure]) -> RetryStats
where
    F: Fetcher + ?Sized,
{
    let mut stats = RetryStats::default();

    if failures.is_empty() {
        return stats;
    }

    tracing::info!("Retrying {} failed documents ...", failures.len());

    for failure in failures {
        stats.attempted += 1;
        let outcome = FetchOutcome::from_result(fetcher.fetch(&failure.url).await);

        match outcome.failure(&failure.url) {
            None => {
                tracing::debug!("Recovered {}", failure.url);
                stats.recovered += 1;
            }
            Some(again) => {
                tracing::warn!("Retry failed for {}", again);
                stats.still_failing.push(again);
            }
        }
    }

    tracing::info!(
        "Retry pass done: {} recovered, {} still failing",
        stats.recovered,
        stats.still_failing.len()
    );

    stats
}
