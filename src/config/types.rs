use serde::Deserialize;

/// Main configuration structure for Sitemap-Warmer
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub warmer: WarmerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub headers: HeadersConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

impl Config {
    /// Builds a configuration that uses every default except the sitemap URL
    pub fn from_sitemap_url(sitemap_url: impl Into<String>) -> Self {
        Self {
            warmer: WarmerConfig {
                sitemap_url: sitemap_url.into(),
                concurrency: default_concurrency(),
                limit: 0,
                retry: true,
                notify: false,
                alternates: false,
                request_timeout: default_request_timeout(),
                connect_timeout: default_connect_timeout(),
                fail_on_errors: false,
            },
            user_agent: UserAgentConfig::default(),
            headers: HeadersConfig::default(),
            notify: NotifyConfig::default(),
        }
    }

    /// Formats the User-Agent header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL)`, or `CrawlerName/Version`
    /// when no contact URL is configured.
    pub fn user_agent_string(&self) -> String {
        let agent = &self.user_agent;
        if agent.contact_url.is_empty() {
            format!("{}/{}", agent.crawler_name, agent.crawler_version)
        } else {
            format!(
                "{}/{} (+{})",
                agent.crawler_name, agent.crawler_version, agent.contact_url
            )
        }
    }
}

/// Warm run behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WarmerConfig {
    /// Root sitemap (index or urlset) to crawl
    #[serde(rename = "sitemap-url")]
    pub sitemap_url: String,

    /// Number of concurrent fetch workers
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// Maximum number of documents to fetch (0 = unlimited)
    #[serde(default)]
    pub limit: usize,

    /// Re-fetch failed documents once after the main pass
    #[serde(default = "default_true")]
    pub retry: bool,

    /// Ping the search engine once the run is complete
    #[serde(default)]
    pub notify: bool,

    /// Also warm alternate-language links declared next to each document
    #[serde(default)]
    pub alternates: bool,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Connection setup timeout (seconds)
    #[serde(rename = "connect-timeout", default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// Exit with an error when failures remain after the retry pass
    #[serde(rename = "fail-on-errors", default)]
    pub fail_on_errors: bool,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// Page describing the warmer, for origin operators
    #[serde(rename = "contact-url", default)]
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: String::new(),
        }
    }
}

/// Fixed headers sent with every document request
#[derive(Debug, Clone, Deserialize)]
pub struct HeadersConfig {
    #[serde(rename = "accept-encoding", default = "default_accept_encoding")]
    pub accept_encoding: String,

    /// Sent as `CDN-Country-Code` to pin the CDN's geo variant
    #[serde(rename = "country-code", default = "default_country_code")]
    pub country_code: String,
}

impl Default for HeadersConfig {
    fn default() -> Self {
        Self {
            accept_encoding: default_accept_encoding(),
            country_code: default_country_code(),
        }
    }
}

/// Search engine notification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    #[serde(rename = "ping-endpoint", default = "default_ping_endpoint")]
    pub ping_endpoint: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            ping_endpoint: default_ping_endpoint(),
        }
    }
}

fn default_concurrency() -> u32 {
    100
}

fn default_true() -> bool {
    true
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_crawler_name() -> String {
    "SitemapWarmer".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_accept_encoding() -> String {
    "gzip".to_string()
}

fn default_country_code() -> String {
    "US".to_string()
}

fn default_ping_endpoint() -> String {
    "https://www.google.com/ping".to_string()
}
