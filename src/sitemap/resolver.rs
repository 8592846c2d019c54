//! Sitemap resolution
//!
//! Walks root sitemap → child sitemaps → document URLs and produces the
//! deduplicated, shuffled list the worker pool drains.

use crate::crawler::Fetcher;
use crate::sitemap::parser::{parse_sitemap, parse_urlset, SitemapDocument, UrlEntry};
use crate::url::{dedup_preserving_order, normalize_location};
use crate::WarmError;
use futures::future::join_all;
use rand::seq::SliceRandom;
use url::Url;

/// Options controlling what the resolver returns
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
    /// Maximum number of documents to keep after deduplication (0 = unlimited)
    pub limit: usize,

    /// Also collect `<xhtml:link rel="alternate">` URLs
    pub include_alternates: bool,
}

/// Output of a sitemap resolution
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Number of child sitemaps listed by the root
    pub child_sitemaps: usize,

    /// Child sitemaps that could not be fetched or parsed
    pub skipped_sitemaps: usize,

    /// URLs found before deduplication and limiting
    pub discovered: usize,

    /// Unique document URLs in shuffled order
    pub documents: Vec<Url>,
}

/// Resolves a root sitemap into the list of document URLs to warm
///
/// # Algorithm
///
/// 1. Fetch and parse the root sitemap; failure here is fatal
/// 2. Fetch every child sitemap concurrently; a child that fails to fetch
///    or parse is logged and skipped
/// 3. Normalize each `<loc>` (and alternate link, if enabled) into an
///    absolute URL, relative to the sitemap that declared it
/// 4. Shuffle the flattened list so requests don't walk the origin in order
/// 5. Deduplicate, keeping the first occurrence
/// 6. Truncate to `limit` when it is non-zero
///
/// A root that is itself a `<urlset>` is treated as its own single child.
///
/// # Returns
///
/// * `Ok(Resolution)` - Documents discovered (possibly empty)
/// * `Err(WarmError::RootSitemap)` - The root sitemap could not be fetched or parsed
pub async fn resolve_sitemap<F>(
    fetcher: &F,
    root_url: &str,
    options: ResolveOptions,
) -> Result<Resolution, WarmError>
where
    F: Fetcher + ?Sized,
{
    let root_error = |reason: String| WarmError::RootSitemap {
        url: root_url.to_string(),
        reason,
    };

    let root = Url::parse(root_url).map_err(|e| root_error(e.to_string()))?;

    tracing::info!("Fetching sitemap {}", root);
    let body = fetch_xml(fetcher, root.as_str()).await.map_err(root_error)?;
    let document = parse_sitemap(&body).map_err(|e| root_error(e.to_string()))?;

    let (child_sitemaps, skipped_sitemaps, urlsets) = match document {
        SitemapDocument::Index(locations) => {
            let children: Vec<Url> = locations
                .iter()
                .filter_map(|loc| match normalize_location(loc, &root) {
                    Ok(url) => Some(url),
                    Err(e) => {
                        tracing::warn!("Ignoring child sitemap location '{}': {}", loc, e);
                        None
                    }
                })
                .collect();

            tracing::info!("Fetching {} sub-sitemaps ...", children.len());
            let results = join_all(children.iter().map(|child| fetch_urlset(fetcher, child))).await;

            let total = locations.len();
            let urlsets: Vec<(Url, Vec<UrlEntry>)> = children
                .into_iter()
                .zip(results)
                .filter_map(|(child, entries)| entries.map(|entries| (child, entries)))
                .collect();
            let skipped = total - urlsets.len();
            (total, skipped, urlsets)
        }
        SitemapDocument::UrlSet(entries) => {
            tracing::debug!("Root sitemap is a urlset, using it directly");
            (1, 0, vec![(root.clone(), entries)])
        }
    };

    let mut urls = Vec::new();
    for (sitemap_url, entries) in &urlsets {
        collect_entry_urls(sitemap_url, entries, options.include_alternates, &mut urls);
    }
    let discovered = urls.len();
    tracing::info!("Retrieved {} documents URLs.", discovered);

    urls.shuffle(&mut rand::thread_rng());

    let mut documents = dedup_preserving_order(urls);
    if documents.len() < discovered {
        tracing::debug!(
            "Dropped {} duplicate document URLs",
            discovered - documents.len()
        );
    }

    if options.limit > 0 && documents.len() > options.limit {
        tracing::info!("Limiting run to {} of {} documents", options.limit, documents.len());
        documents.truncate(options.limit);
    }

    Ok(Resolution {
        child_sitemaps,
        skipped_sitemaps,
        discovered,
        documents,
    })
}

/// Fetches a sitemap body, treating any HTTP error status as a failure
async fn fetch_xml<F>(fetcher: &F, url: &str) -> Result<String, String>
where
    F: Fetcher + ?Sized,
{
    let response = fetcher.fetch(url).await.map_err(|e| e.to_string())?;
    if response.is_error_status() {
        return Err(format!("HTTP {}", response.status));
    }
    Ok(response.body)
}

/// Fetches and parses one child sitemap; `None` means it is skipped
async fn fetch_urlset<F>(fetcher: &F, url: &Url) -> Option<Vec<UrlEntry>>
where
    F: Fetcher + ?Sized,
{
    let body = match fetch_xml(fetcher, url.as_str()).await {
        Ok(body) => body,
        Err(reason) => {
            tracing::warn!("Skipping sitemap {}: {}", url, reason);
            return None;
        }
    };

    match parse_urlset(&body) {
        Ok(entries) => {
            tracing::debug!("Sitemap {} lists {} documents", url, entries.len());
            Some(entries)
        }
        Err(e) => {
            tracing::warn!("Skipping sitemap {}: {}", url, e);
            None
        }
    }
}

fn collect_entry_urls(
    sitemap_url: &Url,
    entries: &[UrlEntry],
    include_alternates: bool,
    out: &mut Vec<Url>,
) {
    for entry in entries {
        let alternates = if include_alternates {
            entry.alternates.as_slice()
        } else {
            &[]
        };

        for raw in std::iter::once(&entry.location).chain(alternates) {
            match normalize_location(raw, sitemap_url) {
                Ok(url) => out.push(url),
                Err(e) => tracing::debug!("Ignoring location '{}' in {}: {}", raw, sitemap_url, e),
            }
        }
    }
}
