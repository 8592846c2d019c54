//! Shared work queue drained by the worker pool

use std::sync::{Mutex, MutexGuard, PoisonError};
use url::Url;

/// Pending document URLs, handed out one at a time
///
/// Each URL is returned by exactly one call to [`WorkQueue::take`], no
/// matter how many workers call it concurrently.
#[derive(Debug, Default)]
pub struct WorkQueue {
    pending: Mutex<Vec<String>>,
}

impl WorkQueue {
    /// Creates a queue that hands out `urls` in the given order
    pub fn new(mut urls: Vec<String>) -> Self {
        // take() pops from the back
        urls.reverse();
        Self {
            pending: Mutex::new(urls),
        }
    }

    /// Creates a queue from resolved document URLs
    pub fn from_urls(urls: Vec<Url>) -> Self {
        Self::new(urls.into_iter().map(String::from).collect())
    }

    /// Removes and returns the next URL, or `None` once the queue is drained
    pub fn take(&self) -> Option<String> {
        self.lock().pop()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
