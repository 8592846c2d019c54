//! Configuration module for Sitemap-Warmer
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use sitemap_warmer::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("warmer.toml")).unwrap();
//! println!("Warming with {} workers", config.warmer.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, HeadersConfig, NotifyConfig, UserAgentConfig, WarmerConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::{validate, MAX_CONCURRENCY};
