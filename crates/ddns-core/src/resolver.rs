//! IP resolution strategy chain
//!
//! [`IpResolver`] tries an ordered list of [`IpSource`] strategies until one
//! yields an IPv4 address. The daemon builds it as DNS lookup of the managed
//! record first, then the external IP-echo service.

use async_trait::async_trait;
use std::net::Ipv4Addr;
use tracing::{debug, info, warn};

use crate::error::ResolutionError;
use crate::traits::IpSource;

/// Record name denoting the domain apex
pub const APEX: &str = "@";

/// Canonical form of a record name: empty and `"@"` both mean the apex
///
/// Used for both the DNS lookup name and the provider URL so the two can
/// never disagree.
pub fn canonical_record_name(record_name: &str) -> &str {
    let trimmed = record_name.trim();
    if trimmed.is_empty() || trimmed == APEX {
        APEX
    } else {
        trimmed
    }
}

/// Fully-qualified name of `record_name` inside `domain`
///
/// ```
/// use ddns_core::fqdn;
///
/// assert_eq!(fqdn("example.com", "@"), "example.com");
/// assert_eq!(fqdn("example.com", ""), "example.com");
/// assert_eq!(fqdn("example.com", "home"), "home.example.com");
/// ```
pub fn fqdn(domain: &str, record_name: &str) -> String {
    let domain = domain.trim();
    match canonical_record_name(record_name) {
        APEX => domain.to_string(),
        name => format!("{name}.{domain}"),
    }
}

/// Ordered chain of IP discovery strategies
///
/// Strategies are tried in insertion order; the first success wins and the
/// remaining ones are not called. When all fail, the error carries every
/// strategy's cause.
pub struct IpResolver {
    strategies: Vec<Box<dyn IpSource>>,
}

impl IpResolver {
    /// Create a resolver trying `strategies` in order
    pub fn new(strategies: Vec<Box<dyn IpSource>>) -> Self {
        Self { strategies }
    }

    /// Append a fallback strategy
    pub fn with_fallback(mut self, strategy: Box<dyn IpSource>) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// Names of the configured strategies, in order
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.source_name()).collect()
    }

    /// Determine the current public IPv4 address
    pub async fn resolve_current_ip(&self) -> Result<Ipv4Addr, ResolutionError> {
        if self.strategies.is_empty() {
            return Err(ResolutionError::NoStrategies);
        }

        let mut causes = Vec::new();
        for strategy in &self.strategies {
            let name = strategy.source_name();
            debug!("Resolving current IP via {}", name);

            match strategy.current().await {
                Ok(ip) => {
                    info!("IP resolved from {}: {}", name, ip);
                    return Ok(ip);
                }
                Err(e) => {
                    if causes.len() + 1 < self.strategies.len() {
                        warn!("{} resolution failed: {}, trying next strategy", name, e);
                    } else {
                        warn!("{} resolution failed: {}", name, e);
                    }
                    causes.push((name, e));
                }
            }
        }

        Err(ResolutionError::Exhausted { causes })
    }
}

#[async_trait]
impl IpSource for IpResolver {
    async fn current(&self) -> Result<Ipv4Addr, ResolutionError> {
        self.resolve_current_ip().await
    }

    fn source_name(&self) -> &'static str {
        "chain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubSource {
        name: &'static str,
        result: Result<Ipv4Addr, ResolutionError>,
        calls: Arc<AtomicUsize>,
    }

    impl StubSource {
        fn boxed(
            name: &'static str,
            result: Result<Ipv4Addr, ResolutionError>,
        ) -> (Box<dyn IpSource>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let source = Self {
                name,
                result,
                calls: Arc::clone(&calls),
            };
            (Box::new(source), calls)
        }
    }

    #[async_trait]
    impl IpSource for StubSource {
        async fn current(&self) -> Result<Ipv4Addr, ResolutionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }

        fn source_name(&self) -> &'static str {
            self.name
        }
    }

    fn no_ipv4() -> ResolutionError {
        ResolutionError::NoIpv4Address {
            fqdn: "example.com".to_string(),
        }
    }

    #[test]
    fn test_fqdn_apex_and_empty_are_bare_domain() {
        assert_eq!(fqdn("example.com", "@"), "example.com");
        assert_eq!(fqdn("example.com", ""), "example.com");
        assert_eq!(fqdn("example.com", "  "), "example.com");
    }

    #[test]
    fn test_fqdn_named_record() {
        assert_eq!(fqdn("example.com", "home"), "home.example.com");
        assert_eq!(fqdn("example.com", "a.b"), "a.b.example.com");
    }

    #[test]
    fn test_canonical_record_name() {
        assert_eq!(canonical_record_name(""), "@");
        assert_eq!(canonical_record_name("@"), "@");
        assert_eq!(canonical_record_name(" www "), "www");
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let dns_ip = Ipv4Addr::new(203, 0, 113, 9);
        let (dns, dns_calls) = StubSource::boxed("dns", Ok(dns_ip));
        let (http, http_calls) = StubSource::boxed("http", Ok(Ipv4Addr::new(198, 51, 100, 1)));

        let resolver = IpResolver::new(vec![dns, http]);
        assert_eq!(resolver.resolve_current_ip().await, Ok(dns_ip));
        assert_eq!(dns_calls.load(Ordering::SeqCst), 1);
        assert_eq!(http_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_falls_back_when_first_fails() {
        let echo_ip = Ipv4Addr::new(198, 51, 100, 1);
        let (dns, _) = StubSource::boxed("dns", Err(no_ipv4()));
        let (http, http_calls) = StubSource::boxed("http", Ok(echo_ip));

        let resolver = IpResolver::new(vec![dns]).with_fallback(http);
        assert_eq!(resolver.strategy_names(), vec!["dns", "http"]);
        assert_eq!(resolver.resolve_current_ip().await, Ok(echo_ip));
        assert_eq!(http_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_all_failing_reports_every_cause() {
        let echo_err = ResolutionError::Echo {
            url: "https://api.ipify.org".to_string(),
            reason: "timed out".to_string(),
        };
        let (dns, _) = StubSource::boxed("dns", Err(no_ipv4()));
        let (http, _) = StubSource::boxed("http", Err(echo_err.clone()));

        let resolver = IpResolver::new(vec![dns, http]);
        let err = resolver.resolve_current_ip().await.unwrap_err();
        assert_eq!(
            err,
            ResolutionError::Exhausted {
                causes: vec![("dns", no_ipv4()), ("http", echo_err)],
            }
        );
    }

    #[tokio::test]
    async fn test_empty_chain_fails() {
        let resolver = IpResolver::new(Vec::new());
        assert_eq!(
            resolver.resolve_current_ip().await,
            Err(ResolutionError::NoStrategies)
        );
    }
}
