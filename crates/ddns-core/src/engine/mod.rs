//! Core DDNS engine
//!
//! The UpdateEngine is responsible for one check-and-update cycle:
//! - Resolving the current public IP via the resolver chain
//! - Reading the published A record from the DnsProvider
//! - Falling back to the StateStore when the provider cannot be read
//! - Replacing the record when the two differ
//! - Persisting the confirmed IP
//!
//! ## Architecture
//!
//! ```text
//!                            ┌──────────────┐
//!                            │  Scheduler   │
//!                            └──────────────┘
//!                                     │ run_cycle()
//!                                     ▼
//!                            ┌──────────────┐
//!                            │ UpdateEngine │
//!                            └──────────────┘
//!                                     │
//!         ┌───────────────────────────┼───────────────────────────┐
//!         │                           │                           │
//!         ▼                           ▼                           ▼
//! ┌─────────────┐           ┌──────────────┐           ┌─────────────┐
//! │ IpResolver  │           │ DnsProvider  │           │ StateStore  │
//! │ (current)   │           │ (read/write) │           │ (fallback)  │
//! └─────────────┘           └──────────────┘           └─────────────┘
//! ```
//!
//! ## Cycle Flow
//!
//! 1. Resolve the current IP; on failure skip the cycle
//! 2. Fetch the published record; on failure use the StateStore as baseline
//! 3. Equal → refresh the StateStore, no provider write
//! 4. Different → replace the record; persist only if that succeeded

mod scheduler;

pub use scheduler::Scheduler;

use std::net::Ipv4Addr;
use tracing::{debug, error, info, warn};

use crate::error::{ProviderError, ResolutionError};
use crate::traits::{DnsProvider, IpSource, StateStore};

/// Where the comparison baseline of a cycle came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaselineSource {
    /// The provider's published record
    Provider,
    /// The StateStore, because the provider could not be read
    Cache,
}

/// Result of one engine cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The current IP could not be determined; nothing was touched
    ResolutionFailed { error: ResolutionError },

    /// The baseline already matched; the StateStore was refreshed
    Unchanged {
        ip: Ipv4Addr,
        baseline_source: BaselineSource,
        state_saved: bool,
    },

    /// The record was replaced
    Updated {
        previous: Option<Ipv4Addr>,
        current: Ipv4Addr,
        baseline_source: BaselineSource,
        state_saved: bool,
    },

    /// The provider rejected the write; the StateStore was left as is
    UpdateFailed {
        previous: Option<Ipv4Addr>,
        current: Ipv4Addr,
        error: ProviderError,
    },
}

impl CycleOutcome {
    /// Whether the published record is known to hold the current IP
    pub fn is_in_sync(&self) -> bool {
        matches!(self, Self::Unchanged { .. } | Self::Updated { .. })
    }
}

/// Core DDNS engine
///
/// Collaborators are passed in explicitly so they can be replaced by
/// in-memory fakes.
///
/// ## Threading
///
/// `run_cycle` is meant to be awaited to completion before the next one is
/// started; the engine holds no cross-cycle memory besides the StateStore.
pub struct UpdateEngine {
    /// IP resolver (normally an `IpResolver` chain)
    resolver: Box<dyn IpSource>,

    /// DNS provider for reading and replacing the record
    provider: Box<dyn DnsProvider>,

    /// Last confirmed-published IP
    state_store: Box<dyn StateStore>,
}

impl UpdateEngine {
    /// Create a new engine
    ///
    /// # Parameters
    ///
    /// - `resolver`: Source of the current public IP
    /// - `provider`: DNS provider implementation
    /// - `state_store`: State store implementation
    pub fn new(
        resolver: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        state_store: Box<dyn StateStore>,
    ) -> Self {
        Self {
            resolver,
            provider,
            state_store,
        }
    }

    /// Run one check-and-update cycle
    ///
    /// Never fails: every error is logged and reflected in the outcome.
    pub async fn run_cycle(&self) -> CycleOutcome {
        // Step 1: current IP
        let current = match self.resolver.current().await {
            Ok(ip) => ip,
            Err(e) => {
                error!("Error getting current IP: {}", e);
                return CycleOutcome::ResolutionFailed { error: e };
            }
        };
        info!("Current IP: {}", current);

        // Step 2: baseline
        let (baseline, baseline_source) = self.baseline().await;

        // Step 3: compare
        if baseline == Some(current) {
            info!(
                "IP matches {} DNS, no update needed",
                self.provider.provider_name()
            );
            let state_saved = self.persist(current).await;
            return CycleOutcome::Unchanged {
                ip: current,
                baseline_source,
                state_saved,
            };
        }

        info!(
            "IP changed from {} to {}",
            baseline.map(|ip| ip.to_string()).unwrap_or_else(|| "<unknown>".to_string()),
            current
        );

        if let Err(e) = self.provider.update_record(current).await {
            error!(
                "Error updating {} DNS: {}",
                self.provider.provider_name(),
                e
            );
            if e.is_auth_failure() {
                warn!("Provider rejected the credentials, check godaddy_api_key/godaddy_api_secret");
            }
            return CycleOutcome::UpdateFailed {
                previous: baseline,
                current,
                error: e,
            };
        }
        info!("Successfully updated {} DNS", self.provider.provider_name());

        let state_saved = self.persist(current).await;
        CycleOutcome::Updated {
            previous: baseline,
            current,
            baseline_source,
            state_saved,
        }
    }

    /// Published IP, or the cached one when the provider cannot be read
    async fn baseline(&self) -> (Option<Ipv4Addr>, BaselineSource) {
        match self.provider.fetch_record().await {
            Ok(record) => {
                info!("{} DNS IP: {}", self.provider.provider_name(), record.data);
                let ip = record.ipv4();
                if ip.is_none() {
                    warn!(
                        "Published record holds {:?}, which is not an IPv4 address",
                        record.data
                    );
                }
                (ip, BaselineSource::Provider)
            }
            Err(e) => {
                error!(
                    "Error fetching {} DNS record: {}",
                    self.provider.provider_name(),
                    e
                );
                if e.is_transient() {
                    debug!("Provider read failure looks transient");
                }
                let cached = self.state_store.get_last_ip().await;
                info!(
                    "Using cached IP from state store: {}",
                    cached.map(|ip| ip.to_string()).unwrap_or_default()
                );
                (cached, BaselineSource::Cache)
            }
        }
    }

    /// Save `ip` to the StateStore, logging failures
    async fn persist(&self, ip: Ipv4Addr) -> bool {
        match self.state_store.save_last_ip(ip).await {
            Ok(()) => {
                debug!("Saved last IP {}", ip);
                true
            }
            Err(e) => {
                error!("Error saving last IP: {}", e);
                false
            }
        }
    }
}
