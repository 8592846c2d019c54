//! Output module for Sitemap-Warmer
//!
//! Holds the summary of a warm run and prints it once the run is over.

mod summary;

pub use summary::{print_summary, RunSummary};
