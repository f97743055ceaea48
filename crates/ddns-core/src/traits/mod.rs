//! Core traits for the DDNS updater
//!
//! This module defines the seams between the engine and its collaborators.
//!
//! - [`IpSource`]: One strategy for discovering the current public IPv4 address
//! - [`DnsProvider`]: Read and replace the published A record
//! - [`StateStore`]: Persisted last-known IP used as a cache fallback

pub mod dns_provider;
pub mod ip_source;
pub mod state_store;

pub use dns_provider::{DnsProvider, DnsRecord};
pub use ip_source::IpSource;
pub use state_store::StateStore;
