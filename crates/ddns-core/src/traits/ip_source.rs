// # IP Source Trait
//
// Defines the interface for a single strategy that discovers the caller's
// current public IPv4 address.
//
// ## Implementations
//
// - DNS lookup of the managed record: `ddns-ip-dns` crate
// - External IP-echo service: `ddns-ip-http` crate
// - Ordered chain of the above: `ddns_core::IpResolver`
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::IpSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* IpSource implementation */;
//
//     let current_ip = source.current().await?;
//     println!("current IP: {current_ip}");
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::Ipv4Addr;

use crate::error::ResolutionError;

/// Trait for IP discovery strategies
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Rules
///
/// - One attempt per call, no retries (the next scheduled cycle is the retry)
/// - Every network call carries a bounded timeout
/// - IPv6 results are ignored, only IPv4 is returned
/// - No access to the state store or the DNS provider
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current public IPv4 address
    ///
    /// # Returns
    ///
    /// - `Ok(Ipv4Addr)`: The current IP address
    /// - `Err(ResolutionError)`: If this strategy could not determine it
    async fn current(&self) -> Result<Ipv4Addr, ResolutionError>;

    /// Short name used in logs and in [`ResolutionError::Exhausted`]
    fn source_name(&self) -> &'static str;
}
