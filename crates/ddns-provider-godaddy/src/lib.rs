// # GoDaddy DNS Provider
//
// This crate provides the GoDaddy implementation of `DnsProvider`.
//
// ## Behavior
//
// - One HTTP request per call, 10 second timeout
// - Non-success statuses are returned as `ProviderError::Status` with the body
// - No retry, no backoff, no caching (a failed write is retried next cycle)
// - Dry-run mode for safe testing
//
// ## Security Requirements
//
// - The API secret NEVER appears in logs or Debug output
// - Credentials are validated by `Config` before a provider is built
//
// ## API Reference
//
// - GoDaddy Domains API v1: https://developer.godaddy.com/doc/endpoint/domains
// - Read record: GET `/v1/domains/{domain}/records/A/{name}`
// - Replace record: PUT `/v1/domains/{domain}/records/A/{name}`
// - Auth header: `Authorization: sso-key {key}:{secret}`

use async_trait::async_trait;
use ddns_core::config::{Config, DEFAULT_API_BASE_URL};
use ddns_core::error::ProviderError;
use ddns_core::traits::{DnsProvider, DnsRecord};
use ddns_core::{canonical_record_name, fqdn};
use std::net::Ipv4Addr;
use std::time::Duration;

/// HTTP timeout for API requests (10 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// GoDaddy DNS provider bound to one A record
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform the GET request
/// - Log the intended PUT payload
/// - **NOT** actually modify the DNS record
pub struct GoDaddyProvider {
    /// API key, sent in the sso-key header
    api_key: String,

    /// API secret
    /// ⚠️ NEVER log this value
    api_secret: String,

    domain: String,

    /// Canonical record name, `"@"` for the apex
    record_name: String,

    ttl: u32,

    /// API base URL without trailing slash
    base_url: String,

    /// Per-request timeout
    timeout: Duration,

    client: reqwest::Client,

    /// Dry-run mode: if true, perform GET requests but skip PUT updates
    dry_run: bool,
}

// Custom Debug implementation that hides the API secret
impl std::fmt::Debug for GoDaddyProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoDaddyProvider")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<REDACTED>")
            .field("domain", &self.domain)
            .field("record_name", &self.record_name)
            .field("ttl", &self.ttl)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl GoDaddyProvider {
    /// Create a new GoDaddy provider against the production API
    ///
    /// # Parameters
    ///
    /// - `api_key`, `api_secret`: GoDaddy production API credentials
    /// - `domain`: The registered domain, e.g. `example.com`
    /// - `record_name`: The A record inside the domain, `"@"` or `""` for the apex
    /// - `ttl`: TTL in seconds sent with every update
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        domain: impl Into<String>,
        record_name: &str,
        ttl: u32,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ProviderError::Transport {
                operation: "client",
                reason: e.to_string(),
            })?;

        Ok(Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            domain: domain.into(),
            record_name: canonical_record_name(record_name).to_string(),
            ttl,
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: DEFAULT_HTTP_TIMEOUT,
            client,
            dry_run: false,
        })
    }

    /// Create a provider from a validated configuration
    pub fn from_config(config: &Config, dry_run: bool) -> Result<Self, ProviderError> {
        let provider = Self::new(
            config.api_key.clone(),
            config.api_secret.clone(),
            config.domain.clone(),
            &config.record_name,
            config.ttl,
        )?
        .with_base_url(&config.api_base_url)
        .with_dry_run(dry_run);

        if dry_run {
            tracing::warn!("GoDaddy provider running in DRY-RUN mode - no changes will be made");
        }
        Ok(provider)
    }

    /// Use a different API endpoint (e.g. the OTE test environment)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Override the request timeout (10 seconds by default)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// URL of the managed record
    ///
    /// ```http
    /// {base}/v1/domains/example.com/records/A/@
    /// ```
    pub fn record_url(&self) -> String {
        format!(
            "{}/v1/domains/{}/records/A/{}",
            self.base_url, self.domain, self.record_name
        )
    }

    fn auth_header(&self) -> String {
        format!("sso-key {}:{}", self.api_key, self.api_secret)
    }

    fn display_name(&self) -> String {
        fqdn(&self.domain, &self.record_name)
    }

    /// Turn a non-success response into `ProviderError::Status`
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
        // GoDaddy answers 200 on success; any other status is a failure
        let status = response.status();
        if status == reqwest::StatusCode::OK {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());

        match status.as_u16() {
            401 | 403 => tracing::debug!("Authentication failed: invalid API key/secret or insufficient permissions"),
            429 => tracing::debug!("Rate limit exceeded"),
            500..=599 => tracing::debug!("GoDaddy server error (transient)"),
            _ => {}
        }

        Err(ProviderError::Status {
            status: status.as_u16(),
            body: body.trim().to_string(),
        })
    }
}

fn request_error(operation: &'static str) -> impl FnOnce(reqwest::Error) -> ProviderError {
    move |e| {
        if e.is_timeout() {
            ProviderError::Timeout { operation }
        } else {
            ProviderError::Transport {
                operation,
                reason: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl DnsProvider for GoDaddyProvider {
    /// Fetch the published A record
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /v1/domains/:domain/records/A/:name
    /// Authorization: sso-key <key>:<secret>
    /// ```
    ///
    /// The response is a JSON array; an empty array means no such record.
    async fn fetch_record(&self) -> Result<DnsRecord, ProviderError> {
        let url = self.record_url();
        tracing::debug!("Fetching A record {}", self.display_name());

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(request_error("GET"))?;

        let response = Self::check_status(response).await?;

        let records: Vec<DnsRecord> = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("failed to parse records: {}", e)))?;

        if records.len() > 1 {
            tracing::warn!(
                "GoDaddy returned {} A records for {}, using the first",
                records.len(),
                self.display_name()
            );
        }

        records
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::RecordNotFound {
                name: self.display_name(),
            })
    }

    /// Replace the A record's value and TTL
    ///
    /// # API Call
    ///
    /// ```http
    /// PUT /v1/domains/:domain/records/A/:name
    /// Authorization: sso-key <key>:<secret>
    /// Content-Type: application/json
    ///
    /// [{"data": "203.0.113.9", "ttl": 600}]
    /// ```
    async fn update_record(&self, ip: Ipv4Addr) -> Result<(), ProviderError> {
        let url = self.record_url();
        let payload = vec![DnsRecord::new(ip, self.ttl)];

        tracing::info!(
            "{} DNS record: {} -> {} [mode: {}]",
            if self.dry_run { "Would update" } else { "Updating" },
            self.display_name(),
            ip,
            if self.dry_run { "DRY-RUN" } else { "LIVE" }
        );

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PUT request to {} with payload: {}",
                url,
                serde_json::to_string(&payload).unwrap_or_default()
            );
            return Ok(());
        }

        let response = self
            .client
            .put(&url)
            .timeout(self.timeout)
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .json(&payload)
            .send()
            .await
            .map_err(request_error("PUT"))?;

        Self::check_status(response).await?;

        tracing::debug!("DNS record updated: {} -> {}", self.display_name(), ip);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "GoDaddy"
    }
}
