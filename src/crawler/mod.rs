//! Crawler module for document warming
//!
//! This module contains the core warming logic, including:
//! - HTTP fetching over a shared keep-alive client
//! - The shared work queue and the worker pool draining it
//! - Failure tracking and the sequential retry pass
//! - Search engine notification
//! - Overall run coordination

mod coordinator;
mod failures;
mod fetcher;
mod notifier;
mod pool;
mod queue;
mod retry;

pub use coordinator::{run_warm, Warmer};
pub use failures::{FailureTracker, FetchFailure};
pub use fetcher::{
    build_http_client, fetch_document, FetchOutcome, FetchResponse, Fetcher, ReqwestFetcher,
    COUNTRY_CODE_HEADER,
};
pub use notifier::{notify_search_engine, ping_url};
pub use pool::{run_pool, PoolStats};
pub use queue::WorkQueue;
pub use retry::{retry_failures, RetryStats};
