//! Run summary and its console rendering

use crate::crawler::{FetchFailure, RetryStats};
use std::time::Duration;

/// Maximum number of failing URLs listed by [`print_summary`]
const MAX_LISTED_FAILURES: usize = 20;

/// Everything a warm run observed
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Child sitemaps listed by the root sitemap
    pub child_sitemaps: usize,

    /// Child sitemaps that were skipped
    pub skipped_sitemaps: usize,

    /// Documents queued for the main pass
    pub documents: usize,

    /// Documents fetched in the main pass
    pub fetched: usize,

    /// Workers used in the main pass
    pub workers: usize,

    /// Failures recorded during the main pass
    pub failures: Vec<FetchFailure>,

    /// Retry pass results, if it ran
    pub retry: Option<RetryStats>,

    /// Whether the search engine accepted the ping, if one was sent
    pub notified: Option<bool>,

    /// Average duration of a single main-pass fetch
    pub average_fetch: Option<Duration>,

    /// Duration of the main pass
    pub main_pass: Duration,

    /// Wall-clock duration of the whole run
    pub elapsed: Duration,
}

impl RunSummary {
    /// Failures left once the retry pass (if any) is done
    pub fn remaining_failures(&self) -> &[FetchFailure] {
        match &self.retry {
            Some(retry) => &retry.still_failing,
            None => &self.failures,
        }
    }
}

/// Prints the summary to stdout in a formatted manner
pub fn print_summary(summary: &RunSummary) {
    println!("=== Warm Summary ===\n");

    println!("Sitemaps:");
    println!("  Child sitemaps: {}", summary.child_sitemaps);
    println!("  Skipped: {}", summary.skipped_sitemaps);
    println!();

    println!("Main pass:");
    println!("  Documents: {}", summary.documents);
    println!("  Fetched: {} with {} workers", summary.fetched, summary.workers);
    println!("  Failures: {}", summary.failures.len());
    if let Some(average) = summary.average_fetch {
        println!("  Average fetch: {}ms", average.as_millis());
    }
    println!("  Duration: {:.2}s", summary.main_pass.as_secs_f64());
    println!();

    match &summary.retry {
        Some(retry) => {
            println!("Retry pass:");
            println!("  Attempted: {}", retry.attempted);
            println!("  Recovered: {}", retry.recovered);
            println!("  Still failing: {}", retry.still_failing.len());
            println!();
        }
        None if !summary.failures.is_empty() => {
            println!("Retry pass: skipped\n");
        }
        None => {}
    }

    let remaining = summary.remaining_failures();
    if !remaining.is_empty() {
        println!("Failed documents:");
        for failure in remaining.iter().take(MAX_LISTED_FAILURES) {
            println!("  - {}", failure);
        }
        if remaining.len() > MAX_LISTED_FAILURES {
            println!("  ... and {} more", remaining.len() - MAX_LISTED_FAILURES);
        }
        println!();
    }

    match summary.notified {
        Some(true) => println!("Search engine notified."),
        Some(false) => println!("Search engine notification failed."),
        None => {}
    }

    println!("Finished in {:.2}s !", summary.elapsed.as_secs_f64());
}
