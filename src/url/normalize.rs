use crate::UrlError;
use url::Url;

/// Normalizes a `<loc>` value found in a sitemap into an absolute document URL
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace; reject if empty
/// 2. Parse as an absolute URL, or resolve it against `base` when relative
/// 3. Require an http/https scheme and a host
/// 4. Remove the fragment (everything after #)
///
/// Host case and the rest of the path are left to the `url` crate's own
/// canonicalization, so two locations compare equal exactly when their
/// serialized forms do.
///
/// # Arguments
///
/// * `raw` - The location text as found in the sitemap
/// * `base` - The URL of the sitemap that declared the location
///
/// # Examples
///
/// ```
/// use sitemap_warmer::url::normalize_location;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/sitemaps/pages.xml").unwrap();
/// let url = normalize_location(" /about#team ", &base).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/about");
/// ```
pub fn normalize_location(raw: &str, base: &Url) -> Result<Url, UrlError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut url = match Url::parse(trimmed) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => base
            .join(trimmed)
            .map_err(|e| UrlError::Parse(e.to_string()))?,
        Err(e) => return Err(UrlError::Parse(e.to_string())),
    };

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    Ok(url)
}
