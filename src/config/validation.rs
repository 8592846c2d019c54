use crate::config::types::{Config, HeadersConfig, NotifyConfig, UserAgentConfig, WarmerConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound on worker count; past this the host runs out of sockets first
pub const MAX_CONCURRENCY: u32 = 200;

/// Content codings the HTTP client can decode
pub const SUPPORTED_ENCODINGS: &[&str] = &["gzip", "br", "identity"];

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_warmer_config(&config.warmer)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_headers_config(&config.headers)?;
    validate_notify_config(&config.notify)?;
    Ok(())
}

fn validate_warmer_config(config: &WarmerConfig) -> Result<(), ConfigError> {
    validate_http_url("sitemap-url", &config.sitemap_url)?;

    if config.concurrency < 1 || config.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.concurrency
        )));
    }

    if config.request_timeout < 1 {
        return Err(ConfigError::Validation(
            "request-timeout must be at least 1 second".to_string(),
        ));
    }

    if config.connect_timeout < 1 {
        return Err(ConfigError::Validation(
            "connect-timeout must be at least 1 second".to_string(),
        ));
    }

    Ok(())
}

fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if !config.contact_url.is_empty() {
        Url::parse(&config.contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;
    }

    Ok(())
}

fn validate_headers_config(config: &HeadersConfig) -> Result<(), ConfigError> {
    if config.accept_encoding.trim().is_empty() {
        return Err(ConfigError::Validation(
            "accept-encoding cannot be empty".to_string(),
        ));
    }

    // Each entry may carry a quality value, e.g. "gzip;q=1.0"
    for entry in config.accept_encoding.split(',') {
        let coding = entry.split(';').next().unwrap_or("").trim();
        if !SUPPORTED_ENCODINGS
            .iter()
            .any(|supported| coding.eq_ignore_ascii_case(supported))
        {
            return Err(ConfigError::Validation(format!(
                "accept-encoding '{}' lists '{}', supported codings are {}",
                config.accept_encoding,
                coding,
                SUPPORTED_ENCODINGS.join(", ")
            )));
        }
    }

    if config.country_code.len() != 2 || !config.country_code.chars().all(|c| c.is_ascii_alphabetic())
    {
        return Err(ConfigError::Validation(format!(
            "country-code must be a two-letter code, got '{}'",
            config.country_code
        )));
    }

    Ok(())
}

fn validate_notify_config(config: &NotifyConfig) -> Result<(), ConfigError> {
    validate_http_url("ping-endpoint", &config.ping_endpoint)
}

/// Requires an absolute http(s) URL with a host
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got '{}'",
            field, value
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "{} has no host: '{}'",
            field, value
        )));
    }

    Ok(())
}
