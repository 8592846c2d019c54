//! Sitemap XML parsing
//!
//! Turns sitemap XML text into either the list of child sitemap locations
//! (`<sitemapindex>`) or the list of document entries (`<urlset>`).
//! Locations are returned exactly as written; normalization is the
//! resolver's job since relative locations depend on where the sitemap
//! was fetched from.

use crate::SitemapError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// A `<url>` entry from a urlset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlEntry {
    /// Content of the `<loc>` element
    pub location: String,

    /// `href` of every `<xhtml:link rel="alternate">` declared in the entry
    pub alternates: Vec<String>,
}

/// A parsed sitemap document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapDocument {
    /// A sitemap index listing child sitemap locations
    Index(Vec<String>),
    /// A urlset listing documents
    UrlSet(Vec<UrlEntry>),
}

/// Parses a sitemap document, dispatching on its root element
///
/// # Returns
///
/// * `Ok(SitemapDocument)` - The root was `<sitemapindex>` or `<urlset>`
/// * `Err(SitemapError)` - Malformed XML, a missing root or any other root element
pub fn parse_sitemap(xml: &str) -> Result<SitemapDocument, SitemapError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut root: Option<String> = None;
    let mut stack: Vec<String> = Vec::new();
    let mut text = String::new();
    let mut current: Option<UrlEntry> = None;
    let mut child_sitemaps = Vec::new();
    let mut entries = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = local_name(&e);
                if root.is_none() {
                    root = Some(name.clone());
                }
                match name.as_str() {
                    "url" => current = Some(UrlEntry::default()),
                    "loc" => text.clear(),
                    "link" if stack.last().map(String::as_str) == Some("url") => {
                        push_alternate(&e, current.as_mut())?;
                    }
                    _ => {}
                }
                stack.push(name);
            }
            Ok(Event::Empty(e)) => {
                let name = local_name(&e);
                if root.is_none() {
                    root = Some(name.clone());
                }
                if name == "link" && stack.last().map(String::as_str) == Some("url") {
                    push_alternate(&e, current.as_mut())?;
                }
            }
            Ok(Event::Text(e)) => {
                if stack.last().map(String::as_str) == Some("loc") {
                    let unescaped = e
                        .unescape()
                        .map_err(|err| SitemapError::Xml(err.to_string()))?;
                    text.push_str(&unescaped);
                }
            }
            Ok(Event::CData(e)) => {
                if stack.last().map(String::as_str) == Some("loc") {
                    text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::End(_)) => {
                let Some(name) = stack.pop() else {
                    return Err(SitemapError::Xml("unbalanced end tag".to_string()));
                };
                match name.as_str() {
                    "loc" => {
                        let location = text.trim().to_string();
                        match stack.last().map(String::as_str) {
                            Some("url") => {
                                if let Some(entry) = current.as_mut() {
                                    entry.location = location;
                                }
                            }
                            Some("sitemap") if !location.is_empty() => {
                                child_sitemaps.push(location);
                            }
                            _ => {}
                        }
                    }
                    "url" => {
                        if let Some(entry) = current.take() {
                            if !entry.location.is_empty() {
                                entries.push(entry);
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => {
                if let Some(open) = stack.last() {
                    return Err(SitemapError::Xml(format!(
                        "unexpected end of document inside <{}>",
                        open
                    )));
                }
                break;
            }
            Err(e) => {
                return Err(SitemapError::Xml(format!(
                    "at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    match root.as_deref() {
        Some("sitemapindex") => Ok(SitemapDocument::Index(child_sitemaps)),
        Some("urlset") => Ok(SitemapDocument::UrlSet(entries)),
        Some(other) => Err(SitemapError::UnexpectedRoot {
            expected: "sitemapindex or urlset",
            found: other.to_string(),
        }),
        None => Err(SitemapError::MissingRoot),
    }
}

/// Parses a `<sitemapindex>` document into its child sitemap locations
pub fn parse_sitemap_index(xml: &str) -> Result<Vec<String>, SitemapError> {
    match parse_sitemap(xml)? {
        SitemapDocument::Index(locations) => Ok(locations),
        SitemapDocument::UrlSet(_) => Err(SitemapError::UnexpectedRoot {
            expected: "sitemapindex",
            found: "urlset".to_string(),
        }),
    }
}

/// Parses a `<urlset>` document into its document entries
pub fn parse_urlset(xml: &str) -> Result<Vec<UrlEntry>, SitemapError> {
    match parse_sitemap(xml)? {
        SitemapDocument::UrlSet(entries) => Ok(entries),
        SitemapDocument::Index(_) => Err(SitemapError::UnexpectedRoot {
            expected: "urlset",
            found: "sitemapindex".to_string(),
        }),
    }
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// Records the `href` of an alternate link on the entry being built
fn push_alternate(e: &BytesStart<'_>, entry: Option<&mut UrlEntry>) -> Result<(), SitemapError> {
    let Some(entry) = entry else {
        return Ok(());
    };

    let mut rel = None;
    let mut href = None;
    for attr in e.attributes() {
        let attr = attr.map_err(|err| SitemapError::Xml(err.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|err| SitemapError::Xml(err.to_string()))?
            .into_owned();
        match attr.key.local_name().as_ref() {
            b"rel" => rel = Some(value),
            b"href" => href = Some(value),
            _ => {}
        }
    }

    if let (Some(rel), Some(href)) = (rel, href) {
        if rel.eq_ignore_ascii_case("alternate") && !href.trim().is_empty() {
            entry.alternates.push(href.trim().to_string());
        }
    }

    Ok(())
}
