//! URL handling module for Sitemap-Warmer
//!
//! Every document URL enters the work queue through [`normalize_location`],
//! so the queue only ever holds absolute http(s) URLs.

mod normalize;

pub use normalize::normalize_location;

use std::collections::HashSet;
use url::Url;

/// Removes duplicate URLs, keeping the first occurrence of each
///
/// Equality is exact string equality on the serialized URL.
pub fn dedup_preserving_order(urls: Vec<Url>) -> Vec<Url> {
    let mut seen = HashSet::with_capacity(urls.len());
    urls.into_iter()
        .filter(|url| seen.insert(url.as_str().to_string()))
        .collect()
}
