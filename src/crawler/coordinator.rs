//! Warm run coordinator
//!
//! Runs the phases of a warm run with a strict barrier between each:
//! - Resolving the sitemap hierarchy into document URLs
//! - Draining the work queue with the worker pool
//! - Retrying failed documents once, sequentially
//! - Notifying the search engine

use crate::config::Config;
use crate::crawler::failures::FailureTracker;
use crate::crawler::fetcher::{Fetcher, ReqwestFetcher};
use crate::crawler::notifier::notify_search_engine;
use crate::crawler::pool::run_pool;
use crate::crawler::queue::WorkQueue;
use crate::crawler::retry::retry_failures;
use crate::output::RunSummary;
use crate::sitemap::{resolve_sitemap, Resolution, ResolveOptions};
use crate::WarmError;
use std::sync::Arc;
use std::time::Instant;

/// Main warm run structure
pub struct Warmer<F: Fetcher = ReqwestFetcher> {
    config: Arc<Config>,
    fetcher: Arc<F>,
}

impl Warmer<ReqwestFetcher> {
    /// Creates a warmer backed by a keep-alive HTTP client
    ///
    /// # Returns
    ///
    /// * `Ok(Warmer)` - Successfully created warmer
    /// * `Err(WarmError)` - Failed to build the HTTP client
    pub fn new(config: Config) -> Result<Self, WarmError> {
        let fetcher = ReqwestFetcher::new(&config)?;
        Ok(Self::with_fetcher(config, fetcher))
    }
}

impl<F: Fetcher> Warmer<F> {
    /// Creates a warmer using the given fetcher for every request
    pub fn with_fetcher(config: Config, fetcher: F) -> Self {
        Self {
            config: Arc::new(config),
            fetcher: Arc::new(fetcher),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Resolves the configured sitemap without fetching any document
    pub async fn resolve(&self) -> Result<Resolution, WarmError> {
        let options = ResolveOptions {
            limit: self.config.warmer.limit,
            include_alternates: self.config.warmer.alternates,
        };
        resolve_sitemap(self.fetcher.as_ref(), &self.config.warmer.sitemap_url, options).await
    }

    /// Runs a complete warm
    ///
    /// Only a root sitemap failure aborts the run; document failures are
    /// recorded in the returned summary.
    pub async fn run(&self) -> Result<RunSummary, WarmError> {
        let start = Instant::now();
        let warmer = &self.config.warmer;

        let resolution = self.resolve().await?;
        let documents = resolution.documents.len();

        let queue = Arc::new(WorkQueue::from_urls(resolution.documents));
        let tracker = Arc::new(FailureTracker::new());

        tracing::info!(
            "Fetching {} documents with {} concurrent fetches.",
            documents,
            warmer.concurrency
        );
        let stats = run_pool(
            queue,
            Arc::clone(&self.fetcher),
            Arc::clone(&tracker),
            warmer.concurrency as usize,
        )
        .await;

        tracing::info!(
            "Fetched {} documents in {:.2}s ({} failed)",
            stats.fetched,
            stats.elapsed.as_secs_f64(),
            stats.failed
        );
        if let Some(average) = stats.average_fetch() {
            tracing::info!("Fetch average duration: {}ms", average.as_millis());
        }

        let failures = tracker.snapshot();

        let retry = if warmer.retry && !failures.is_empty() {
            Some(retry_failures(self.fetcher.as_ref(), &failures).await)
        } else {
            None
        };

        let notified = if warmer.notify {
            match notify_search_engine(
                self.fetcher.as_ref(),
                &self.config.notify.ping_endpoint,
                &warmer.sitemap_url,
            )
            .await
            {
                Ok(status) => {
                    tracing::info!("Search engine notified ({}).", status);
                    Some(true)
                }
                Err(e) => {
                    tracing::warn!("Search engine notification failed: {}", e);
                    Some(false)
                }
            }
        } else {
            None
        };

        let elapsed = start.elapsed();
        tracing::info!("Finished in {:.2}s !", elapsed.as_secs_f64());

        Ok(RunSummary {
            child_sitemaps: resolution.child_sitemaps,
            skipped_sitemaps: resolution.skipped_sitemaps,
            documents,
            fetched: stats.fetched,
            workers: stats.workers,
            failures,
            retry,
            notified,
            average_fetch: stats.average_fetch(),
            main_pass: stats.elapsed,
            elapsed,
        })
    }
}

/// Runs a complete warm with the production HTTP client
///
/// # Arguments
///
/// * `config` - The warmer configuration
///
/// # Returns
///
/// * `Ok(RunSummary)` - The run completed (documents may still have failed)
/// * `Err(WarmError)` - The run could not start or the root sitemap failed
pub async fn run_warm(config: Config) -> Result<RunSummary, WarmError> {
    Warmer::new(config)?.run().await
}
