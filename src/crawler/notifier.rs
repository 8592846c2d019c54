//! Search engine notification

use crate::crawler::fetcher::Fetcher;
use crate::{NotifyError, UrlError};
use url::Url;

/// Builds `endpoint?sitemap=<sitemap_url>`, keeping any query the endpoint already has
pub fn ping_url(endpoint: &str, sitemap_url: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(endpoint).map_err(|e| UrlError::Parse(e.to_string()))?;
    url.query_pairs_mut().append_pair("sitemap", sitemap_url);
    Ok(url)
}

/// Asks a search engine to re-crawl the sitemap
///
/// Issues a single GET to the ping endpoint.
///
/// # Returns
///
/// * `Ok(u16)` - The endpoint accepted the ping with this status
/// * `Err(NotifyError)` - Bad endpoint, transport failure, or a 4xx/5xx answer
pub async fn notify_search_engine<F>(
    fetcher: &F,
    endpoint: &str,
    sitemap_url: &str,
) -> Result<u16, NotifyError>
where
    F: Fetcher + ?Sized,
{
    let url = ping_url(endpoint, sitemap_url)?;
    tracing::info!("Notifying {} for re-crawl.", url.host_str().unwrap_or(endpoint));

    let response = fetcher.fetch(url.as_str()).await?;
    if response.is_error_status() {
        return Err(NotifyError::Rejected {
            status: response.status,
        });
    }

    Ok(response.status)
}
