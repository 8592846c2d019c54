//! Sitemap-Warmer: a cache primer driven by sitemaps
//!
//! This crate walks a website's sitemap hierarchy and requests every
//! published document through a bounded pool of workers, warming the
//! upstream cache/CDN along the way. Failed documents are retried once and a
//! search engine can optionally be pinged once the run completes.

pub mod config;
pub mod crawler;
pub mod output;
pub mod sitemap;
pub mod url;

use thiserror::Error;

/// Main error type for Sitemap-Warmer operations
#[derive(Debug, Error)]
pub enum WarmError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Root sitemap {url} could not be resolved: {reason}")]
    RootSitemap { url: String, reason: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Empty location")]
    Empty,
}

/// Sitemap document errors
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("Malformed XML: {0}")]
    Xml(String),

    #[error("Unexpected root element <{found}>, expected <{expected}>")]
    UnexpectedRoot { expected: &'static str, found: String },

    #[error("Document has no root element")]
    MissingRoot,
}

/// Transport-level fetch errors (no HTTP response was received)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Request timeout")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Request failed: {0}")]
    Request(String),
}

/// Search engine notification errors
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Invalid ping URL: {0}")]
    Url(#[from] UrlError),

    #[error("Ping request failed: {0}")]
    Transport(#[from] FetchError),

    #[error("Ping rejected with HTTP {status}")]
    Rejected { status: u16 },
}

/// Result type alias for Sitemap-Warmer operations
pub type Result<T> = std::result::Result<T, WarmError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_warm, Warmer};
pub use output::RunSummary;
pub use crate::url::normalize_location;
