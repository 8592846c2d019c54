//! Failure tracking shared by all workers

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A document that could not be warmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    /// The document URL
    pub url: String,

    /// HTTP status, or `None` when no response was received
    pub status: Option<u16>,

    /// Transport error description, if any
    pub error: Option<String>,
}

impl FetchFailure {
    /// A failure caused by a 4xx/5xx response
    pub fn http(url: impl Into<String>, status: u16) -> Self {
        Self {
            url: url.into(),
            status: Some(status),
            error: None,
        }
    }

    /// A failure caused by a transport error
    pub fn transport(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: None,
            error: Some(error.into()),
        }
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.status, &self.error) {
            (Some(status), _) => write!(f, "{} (HTTP {})", self.url, status),
            (None, Some(error)) => write!(f, "{} ({})", self.url, error),
            (None, None) => write!(f, "{}", self.url),
        }
    }
}

/// Append-only collection of failures, written concurrently by the workers
///
/// Nothing is ever removed; the retry pass reads a snapshot once every
/// worker has exited.
#[derive(Debug, Default)]
pub struct FailureTracker {
    failures: Mutex<Vec<FetchFailure>>,
}

impl FailureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a failure
    pub fn record(&self, failure: FetchFailure) {
        self.lock().push(failure);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copies the failures recorded so far, in recording order
    pub fn snapshot(&self) -> Vec<FetchFailure> {
        self.lock().clone()
    }

    // A worker that panicked mid-push cannot leave the Vec half-written.
    fn lock(&self) -> MutexGuard<'_, Vec<FetchFailure>> {
        self.failures.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
