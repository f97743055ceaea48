// # ddns-core
//
// Core library for the GoDaddy dynamic-DNS updater.
//
// ## Architecture Overview
//
// This library holds the whole update-decision pipeline:
// - **IpSource**: Trait for a single strategy that discovers the public IPv4 address
// - **IpResolver**: Ordered chain of `IpSource` strategies (DNS first, then IP-echo)
// - **DnsProvider**: Trait for reading and replacing the published A record
// - **StateStore**: Trait for the persisted last-known IP (cache fallback)
// - **UpdateEngine**: One check-and-update cycle
// - **Scheduler**: Runs the engine on a fixed interval, forever
//
// ## Design Principles
//
// 1. **Explicit dependencies**: The engine receives its collaborators as trait objects
// 2. **Tagged errors**: Each component fails with its own error enum
// 3. **Single thread of control**: Cycles never overlap, no locking around state
// 4. **Library-First**: The daemon is a thin wiring layer over this crate

pub mod config;
pub mod engine;
pub mod error;
pub mod resolver;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use config::Config;
pub use engine::{BaselineSource, CycleOutcome, Scheduler, UpdateEngine};
pub use error::{ConfigError, Error, ProviderError, ResolutionError, Result, StateError};
pub use resolver::{IpResolver, canonical_record_name, fqdn};
pub use state::{FileStateStore, MemoryStateStore};
pub use traits::{DnsProvider, DnsRecord, IpSource, StateStore};
