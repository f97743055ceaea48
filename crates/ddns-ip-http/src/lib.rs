// # HTTP IP Source
//
// This crate provides an IP source backed by an external IP-echo service.
//
// ## Purpose
//
// Fallback strategy of the resolver chain: used when the DNS lookup of the
// managed record fails or yields no IPv4 address. The service answers a
// plain GET with the caller's public IP as text.
//
// ## Behavior
//
// - One GET per call, 10 second timeout, no retries
// - Non-success statuses are failures
// - The body is trimmed and must be a dotted-decimal IPv4 address

use async_trait::async_trait;
use ddns_core::config::DEFAULT_IP_ECHO_URL;
use ddns_core::error::ResolutionError;
use ddns_core::traits::IpSource;

use std::net::Ipv4Addr;
use std::time::Duration;

/// HTTP timeout for the echo request
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

const SOURCE_NAME: &str = "http";

/// IP-echo service source
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// URL returning the caller's IP as plain text
    url: String,

    /// Per-request timeout
    timeout: Duration,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: URL to fetch the IP from (e.g., "https://api.ipify.org?format=text")
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: DEFAULT_HTTP_TIMEOUT,
            client: reqwest::Client::builder().build().unwrap_or_default(),
        }
    }

    /// Override the request timeout (10 seconds by default)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch current IP from the echo service
    async fn fetch_ip(&self) -> Result<Ipv4Addr, ResolutionError> {
        let response = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        if !response.status().is_success() {
            return Err(ResolutionError::Echo {
                url: self.url.clone(),
                reason: format!("HTTP error: {}", response.status()),
            });
        }

        let ip_text = response
            .text()
            .await
            .map_err(|e| self.request_error(e))?;

        let ip_text = ip_text.trim();

        ip_text
            .parse::<Ipv4Addr>()
            .map_err(|_| ResolutionError::InvalidAddress {
                strategy: SOURCE_NAME.to_string(),
                value: ip_text.to_string(),
            })
    }

    fn request_error(&self, e: reqwest::Error) -> ResolutionError {
        if e.is_timeout() {
            ResolutionError::Timeout {
                strategy: SOURCE_NAME.to_string(),
                secs: self.timeout.as_secs(),
            }
        } else {
            ResolutionError::Echo {
                url: self.url.clone(),
                reason: e.to_string(),
            }
        }
    }
}

impl Default for HttpIpSource {
    fn default() -> Self {
        Self::new(DEFAULT_IP_ECHO_URL)
    }
}

#[async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<Ipv4Addr, ResolutionError> {
        tracing::debug!("Fetching public IP from {}", self.url);
        self.fetch_ip().await
    }

    fn source_name(&self) -> &'static str {
        SOURCE_NAME
    }
}
