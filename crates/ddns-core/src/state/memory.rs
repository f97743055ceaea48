// # Memory State Store
//
// In-memory implementation of StateStore.
//
// ## Crash Behavior
//
// - The last IP is lost on restart/crash
// - A provider outage on the first cycle after a restart has no baseline,
//   so an update is attempted
//
// ## When to Use
//
// - Testing environments
// - Embedding the engine where the provider is always reachable

use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::StateError;
use crate::traits::StateStore;

/// In-memory state store implementation
///
/// Clones share the same value.
///
/// # Example
///
/// ```rust
/// use ddns_core::state::MemoryStateStore;
/// use ddns_core::traits::StateStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryStateStore::new();
///     assert_eq!(store.get_last_ip().await, None);
///
///     store.save_last_ip("203.0.113.9".parse()?).await?;
///     assert_eq!(store.get_last_ip().await, Some("203.0.113.9".parse()?));
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    inner: Arc<RwLock<Option<Ipv4Addr>>>,
}

impl MemoryStateStore {
    /// Create an empty memory state store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with `ip`
    pub fn with_last_ip(ip: Ipv4Addr) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(ip))),
        }
    }

    /// Forget the stored value
    pub async fn clear(&self) {
        *self.inner.write().await = None;
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get_last_ip(&self) -> Option<Ipv4Addr> {
        *self.inner.read().await
    }

    async fn save_last_ip(&self, ip: Ipv4Addr) -> Result<(), StateError> {
        *self.inner.write().await = Some(ip);
        Ok(())
    }
}
