// # DNS Provider Trait
//
// Defines the interface for reading and replacing the single A record the
// updater manages.
//
// ## Implementations
//
// - GoDaddy: `ddns-provider-godaddy` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::DnsProvider;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     let record = provider.fetch_record().await?;
//     if record.data != "203.0.113.9" {
//         provider.update_record("203.0.113.9".parse()?).await?;
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

use crate::error::ProviderError;

/// A DNS A record as exchanged with the provider
///
/// Unknown fields in provider responses (name, type, ...) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// The record value, a dotted-decimal IPv4 address
    pub data: String,
    /// Time-to-live in seconds
    pub ttl: u32,
}

impl DnsRecord {
    /// Create a record pointing at `ip`
    pub fn new(ip: Ipv4Addr, ttl: u32) -> Self {
        Self {
            data: ip.to_string(),
            ttl,
        }
    }

    /// The record value as an IPv4 address, if it is one
    pub fn ipv4(&self) -> Option<Ipv4Addr> {
        self.data.trim().parse().ok()
    }
}

/// Trait for DNS provider implementations
///
/// A provider is bound to one (domain, record name, type A) triple at
/// construction time.
///
/// # Rules
///
/// - One HTTP request per call, bounded by a request timeout
/// - No retry or backoff (a failed write is retried by the next cycle)
/// - No access to the state store, no caching beyond a single request
/// - No decision about whether an update is needed (owned by `UpdateEngine`)
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Fetch the currently published A record
    ///
    /// # Returns
    ///
    /// - `Ok(DnsRecord)`: The published record
    /// - `Err(ProviderError::RecordNotFound)`: The provider has no such record
    /// - `Err(ProviderError)`: Any other request failure
    async fn fetch_record(&self) -> Result<DnsRecord, ProviderError>;

    /// Replace the A record with `ip` and the configured TTL
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The provider accepted the new record
    /// - `Err(ProviderError)`: The write failed, nothing should be persisted
    async fn update_record(&self, ip: Ipv4Addr) -> Result<(), ProviderError>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
