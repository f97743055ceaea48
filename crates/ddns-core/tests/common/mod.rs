//! Test doubles and common utilities for engine contract tests
//!
//! Every double keeps its state behind `Arc`s, so a test clones the double,
//! hands one copy to the engine, and inspects the other afterwards.

#![allow(dead_code)]

use ddns_core::error::{ProviderError, ResolutionError, StateError};
use ddns_core::traits::{DnsProvider, DnsRecord, IpSource, StateStore};
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const TTL: u32 = 600;

/// An IpSource whose answer the test controls
#[derive(Clone)]
pub struct ScriptedIpSource {
    name: &'static str,
    result: Arc<Mutex<Result<Ipv4Addr, ResolutionError>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedIpSource {
    pub fn returning(ip: Ipv4Addr) -> Self {
        Self::with_result("scripted", Ok(ip))
    }

    pub fn failing() -> Self {
        Self::with_result(
            "scripted",
            Err(ResolutionError::Echo {
                url: "https://api.ipify.org".to_string(),
                reason: "connection refused".to_string(),
            }),
        )
    }

    pub fn with_result(name: &'static str, result: Result<Ipv4Addr, ResolutionError>) -> Self {
        Self {
            name,
            result: Arc::new(Mutex::new(result)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn set_ip(&self, ip: Ipv4Addr) {
        *self.result.lock().unwrap() = Ok(ip);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for ScriptedIpSource {
    async fn current(&self) -> Result<Ipv4Addr, ResolutionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.lock().unwrap().clone()
    }

    fn source_name(&self) -> &'static str {
        self.name
    }
}

/// A DnsProvider that records calls and publishes successful updates
#[derive(Clone)]
pub struct MockDnsProvider {
    published: Arc<Mutex<Result<DnsRecord, ProviderError>>>,
    update_error: Arc<Mutex<Option<ProviderError>>>,
    fetch_calls: Arc<AtomicUsize>,
    updates: Arc<Mutex<Vec<DnsRecord>>>,
}

impl MockDnsProvider {
    /// Provider currently publishing `ip`
    pub fn publishing(ip: &str) -> Self {
        Self::with_fetch_result(Ok(DnsRecord {
            data: ip.to_string(),
            ttl: TTL,
        }))
    }

    /// Provider whose reads fail with HTTP 500
    pub fn read_failing() -> Self {
        Self::with_fetch_result(Err(server_error()))
    }

    pub fn with_fetch_result(result: Result<DnsRecord, ProviderError>) -> Self {
        Self {
            published: Arc::new(Mutex::new(result)),
            update_error: Arc::new(Mutex::new(None)),
            fetch_calls: Arc::new(AtomicUsize::new(0)),
            updates: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Make every subsequent write fail with `error`
    pub fn fail_updates_with(&self, error: ProviderError) {
        *self.update_error.lock().unwrap() = Some(error);
    }

    /// Make every subsequent read fail with `error`
    pub fn fail_reads_with(&self, error: ProviderError) {
        *self.published.lock().unwrap() = Err(error);
    }

    pub fn fetch_call_count(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn update_call_count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }

    /// Every record passed to `update_record`, in call order
    pub fn updates(&self) -> Vec<DnsRecord> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn fetch_record(&self) -> Result<DnsRecord, ProviderError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.published.lock().unwrap().clone()
    }

    async fn update_record(&self, ip: Ipv4Addr) -> Result<(), ProviderError> {
        let record = DnsRecord::new(ip, TTL);
        self.updates.lock().unwrap().push(record.clone());

        if let Some(error) = self.update_error.lock().unwrap().clone() {
            return Err(error);
        }

        // Only replace what reads return if reads currently succeed
        let mut published = self.published.lock().unwrap();
        if published.is_ok() {
            *published = Ok(record);
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A StateStore that counts writes and can be told to fail them
#[derive(Clone, Default)]
pub struct MockStateStore {
    value: Arc<Mutex<Option<Ipv4Addr>>>,
    save_calls: Arc<AtomicUsize>,
    fail_saves: Arc<AtomicBool>,
}

impl MockStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(ip: Ipv4Addr) -> Self {
        let store = Self::default();
        *store.value.lock().unwrap() = Some(ip);
        store
    }

    pub fn fail_saves(&self) {
        self.fail_saves.store(true, Ordering::SeqCst);
    }

    pub fn value(&self) -> Option<Ipv4Addr> {
        *self.value.lock().unwrap()
    }

    pub fn save_call_count(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl StateStore for MockStateStore {
    async fn get_last_ip(&self) -> Option<Ipv4Addr> {
        *self.value.lock().unwrap()
    }

    async fn save_last_ip(&self, ip: Ipv4Addr) -> Result<(), StateError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StateError::Write {
                path: PathBuf::from("last_ip.txt"),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        *self.value.lock().unwrap() = Some(ip);
        Ok(())
    }
}

pub fn server_error() -> ProviderError {
    ProviderError::Status {
        status: 500,
        body: "internal server error".to_string(),
    }
}

pub fn ip(s: &str) -> Ipv4Addr {
    s.parse().expect("valid IPv4 literal")
}

/// Build an engine over clones of the given doubles
pub fn engine(
    source: &ScriptedIpSource,
    provider: &MockDnsProvider,
    store: &MockStateStore,
) -> ddns_core::UpdateEngine {
    ddns_core::UpdateEngine::new(
        Box::new(source.clone()),
        Box::new(provider.clone()),
        Box::new(store.clone()),
    )
}
