// # DNS IP Source
//
// This crate provides an IP source that resolves the managed record's
// fully-qualified name through the system resolver.
//
// ## Purpose
//
// Primary strategy of the resolver chain. For hosts whose A record already
// tracks them (or is kept fresh by this updater) the lookup is cheap and
// needs no third-party service.
//
// ## Behavior
//
// - One lookup per call, bounded by a 10 second timeout
// - The first IPv4 address in the answer wins, IPv6 answers are skipped
// - An answer with only IPv6 addresses is `ResolutionError::NoIpv4Address`

use async_trait::async_trait;
use ddns_core::error::ResolutionError;
use ddns_core::traits::IpSource;

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// Time budget for a single lookup
const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

const SOURCE_NAME: &str = "dns";

/// Resolves a host name and returns its first IPv4 address
#[derive(Debug, Clone)]
pub struct DnsLookupSource {
    /// Name to resolve, e.g. `home.example.com`
    fqdn: String,

    timeout: Duration,
}

impl DnsLookupSource {
    /// Create a source resolving `fqdn`
    pub fn new(fqdn: impl Into<String>) -> Self {
        Self {
            fqdn: fqdn.into(),
            timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    /// Override the lookup timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn fqdn(&self) -> &str {
        &self.fqdn
    }

    async fn lookup(&self) -> Result<Ipv4Addr, ResolutionError> {
        let addrs = tokio::net::lookup_host((self.fqdn.as_str(), 0))
            .await
            .map_err(|e| ResolutionError::Lookup {
                fqdn: self.fqdn.clone(),
                reason: e.to_string(),
            })?;

        addrs
            .filter_map(|addr| match addr.ip() {
                IpAddr::V4(ip) => Some(ip),
                IpAddr::V6(_) => None,
            })
            .next()
            .ok_or_else(|| ResolutionError::NoIpv4Address {
                fqdn: self.fqdn.clone(),
            })
    }
}

#[async_trait]
impl IpSource for DnsLookupSource {
    async fn current(&self) -> Result<Ipv4Addr, ResolutionError> {
        tracing::debug!("Resolving {} via DNS", self.fqdn);

        match tokio::time::timeout(self.timeout, self.lookup()).await {
            Ok(result) => result,
            Err(_) => Err(ResolutionError::Timeout {
                strategy: SOURCE_NAME.to_string(),
                secs: self.timeout.as_secs(),
            }),
        }
    }

    fn source_name(&self) -> &'static str {
        SOURCE_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_name() {
        let source = DnsLookupSource::new("example.com");
        assert_eq!(source.source_name(), "dns");
        assert_eq!(source.fqdn(), "example.com");
    }

    #[tokio::test]
    async fn test_ipv4_literal_resolves_to_itself() {
        let source = DnsLookupSource::new("127.0.0.1");
        assert_eq!(source.current().await, Ok(Ipv4Addr::LOCALHOST));
    }

    #[test]
    fn test_default_timeout_is_ten_seconds() {
        assert_eq!(DnsLookupSource::new("example.com").timeout, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_lookup_exceeding_budget_times_out() {
        // A host name goes through the blocking resolver, which cannot finish in zero time
        let source = DnsLookupSource::new("ddns-timeout-check.invalid").with_timeout(Duration::ZERO);

        assert_eq!(
            source.current().await,
            Err(ResolutionError::Timeout {
                strategy: "dns".to_string(),
                secs: 0,
            })
        );
    }

    #[tokio::test]
    async fn test_ipv6_only_answer_has_no_ipv4() {
        let source = DnsLookupSource::new("::1");
        assert_eq!(
            source.current().await,
            Err(ResolutionError::NoIpv4Address {
                fqdn: "::1".to_string(),
            })
        );
    }
}
