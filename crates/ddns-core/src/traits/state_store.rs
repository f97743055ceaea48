// # State Store Trait
//
// Defines the interface for the persisted last-known IP.
//
// ## Purpose
//
// The stored value is the most recently confirmed-published IP. It is only
// consulted when the provider's record cannot be read, so that a transient
// provider outage neither forces a spurious update nor fails the cycle.
//
// ## Implementations
//
// - File-based: `FileStateStore` (plain text, atomic writes)
// - In-memory: `MemoryStateStore`
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::StateStore;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let store = /* StateStore implementation */;
//
//     // `None` on first run
//     let last_ip = store.get_last_ip().await;
//
//     store.save_last_ip("203.0.113.9".parse()?).await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::Ipv4Addr;

use crate::error::StateError;

/// Trait for state store implementations
///
/// # Rules
///
/// - Reads never fail: a missing, unreadable or corrupt value is "unknown"
/// - Writes must not leave a half-written value behind
/// - No business logic (owned by `UpdateEngine`)
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Get the last known IP
    ///
    /// # Returns
    ///
    /// - `Some(Ipv4Addr)`: The last confirmed-published IP
    /// - `None`: Unknown (first run, missing or corrupt state)
    async fn get_last_ip(&self) -> Option<Ipv4Addr>;

    /// Persist `ip` as the last known IP
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Durably stored
    /// - `Err(StateError)`: Write failure, the previous value is kept
    async fn save_last_ip(&self, ip: Ipv4Addr) -> Result<(), StateError>;
}
