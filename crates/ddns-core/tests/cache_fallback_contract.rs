//! Contract Test: Cache Fallback
//!
//! When the provider's record cannot be read, the state store's last value
//! becomes the baseline. The cycle does not fail because of the read.
//!
//! Constraints verified:
//! - Read failure with an empty cache attempts an update
//! - Read failure with a matching cache performs no write
//! - The cache is never consulted when the provider read succeeds

mod common;

use common::*;
use ddns_core::error::ProviderError;
use ddns_core::{BaselineSource, CycleOutcome};

#[tokio::test]
async fn read_failure_on_first_run_attempts_update() {
    // Provider read returns HTTP 500, state store empty
    let source = ScriptedIpSource::returning(ip("203.0.113.9"));
    let provider = MockDnsProvider::read_failing();
    let store = MockStateStore::new();

    let outcome = engine(&source, &provider, &store).run_cycle().await;

    assert_eq!(
        outcome,
        CycleOutcome::Updated {
            previous: None,
            current: ip("203.0.113.9"),
            baseline_source: BaselineSource::Cache,
            state_saved: true,
        }
    );
    assert_eq!(provider.update_call_count(), 1);
    assert_eq!(store.value(), Some(ip("203.0.113.9")));
}

#[tokio::test]
async fn read_failure_with_matching_cache_skips_write() {
    let source = ScriptedIpSource::returning(ip("203.0.113.9"));
    let provider = MockDnsProvider::with_fetch_result(Err(ProviderError::Timeout {
        operation: "GET",
    }));
    let store = MockStateStore::seeded(ip("203.0.113.9"));

    let outcome = engine(&source, &provider, &store).run_cycle().await;

    assert_eq!(
        outcome,
        CycleOutcome::Unchanged {
            ip: ip("203.0.113.9"),
            baseline_source: BaselineSource::Cache,
            state_saved: true,
        }
    );
    assert_eq!(provider.update_call_count(), 0);
}

#[tokio::test]
async fn read_failure_with_stale_cache_updates() {
    let source = ScriptedIpSource::returning(ip("203.0.113.9"));
    let provider = MockDnsProvider::with_fetch_result(Err(ProviderError::RecordNotFound {
        name: "example.com".to_string(),
    }));
    let store = MockStateStore::seeded(ip("203.0.113.1"));

    let outcome = engine(&source, &provider, &store).run_cycle().await;

    assert_eq!(
        outcome,
        CycleOutcome::Updated {
            previous: Some(ip("203.0.113.1")),
            current: ip("203.0.113.9"),
            baseline_source: BaselineSource::Cache,
            state_saved: true,
        }
    );
}

#[tokio::test]
async fn later_cycles_compare_against_persisted_update() {
    let source = ScriptedIpSource::returning(ip("203.0.113.9"));
    let provider = MockDnsProvider::publishing("203.0.113.1");
    let store = MockStateStore::new();
    let engine = engine(&source, &provider, &store);

    assert!(matches!(engine.run_cycle().await, CycleOutcome::Updated { .. }));

    // Provider goes down; the cache now holds the IP we just published
    provider.fail_reads_with(server_error());
    let outcome = engine.run_cycle().await;

    assert_eq!(
        outcome,
        CycleOutcome::Unchanged {
            ip: ip("203.0.113.9"),
            baseline_source: BaselineSource::Cache,
            state_saved: true,
        }
    );
    assert_eq!(provider.update_call_count(), 1);
}

#[tokio::test]
async fn provider_is_authoritative_over_cache() {
    // Cache says in sync, provider says otherwise: provider wins
    let source = ScriptedIpSource::returning(ip("203.0.113.9"));
    let provider = MockDnsProvider::publishing("203.0.113.1");
    let store = MockStateStore::seeded(ip("203.0.113.9"));

    let outcome = engine(&source, &provider, &store).run_cycle().await;

    assert!(matches!(
        outcome,
        CycleOutcome::Updated {
            baseline_source: BaselineSource::Provider,
            ..
        }
    ));
    assert_eq!(provider.update_call_count(), 1);
}
