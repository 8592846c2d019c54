//! Sitemap module for Sitemap-Warmer
//!
//! This module contains:
//! - XML parsing of sitemap indexes and urlsets
//! - Resolution of a root sitemap into the document URLs to warm

mod parser;
mod resolver;

pub use parser::{parse_sitemap, parse_sitemap_index, parse_urlset, SitemapDocument, UrlEntry};
pub use resolver::{resolve_sitemap, Resolution, ResolveOptions};
