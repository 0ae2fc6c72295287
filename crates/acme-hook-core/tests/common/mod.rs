//! Test doubles and common utilities for orchestrator contract tests
//!
//! The mock provider keeps an in-memory "zone" so tests can check the final
//! record state, and counts every call so tests can prove that nothing
//! reached a provider.

#![allow(dead_code)]

use acme_hook_core::config::keys;
use acme_hook_core::diagnostics::dump_request;
use acme_hook_core::traits::{ChallengeProvider, ChallengeProviderFactory, LogSink, Outcome, ProviderContext};
use acme_hook_core::{DomainName, HookConfig, Keychain, ProviderRegistry, Result, ValidationToken};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Identifier the mock factory is registered under
pub const MOCK_PROVIDER: &str = "mock";

/// API key placed in the mock keychain
pub const MOCK_API_KEY: &str = "mock-api-key-5f9c1e";

/// Shared state behind every mock client built by one factory
#[derive(Default)]
pub struct MockZone {
    /// Factory create() calls
    constructed: AtomicUsize,
    /// add_or_update_record() calls
    calls: AtomicUsize,
    creations: AtomicUsize,
    updates: AtomicUsize,
    deletions: AtomicUsize,
    /// Record name -> content
    records: Mutex<HashMap<String, String>>,
    /// Outcomes to return before touching the zone
    scripted: Mutex<VecDeque<Outcome>>,
}

impl MockZone {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make the next calls return these outcomes (Success falls through to the zone)
    pub fn script(&self, outcomes: impl IntoIterator<Item = Outcome>) {
        self.scripted.lock().unwrap().extend(outcomes);
    }

    /// Pre-populate a record
    pub fn seed(&self, name: &str, content: &str) {
        self.records
            .lock()
            .unwrap()
            .insert(name.to_string(), content.to_string());
    }

    pub fn record(&self, name: &str) -> Option<String> {
        self.records.lock().unwrap().get(name).cloned()
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn constructed(&self) -> usize {
        self.constructed.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn creations(&self) -> usize {
        self.creations.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn deletions(&self) -> usize {
        self.deletions.load(Ordering::SeqCst)
    }
}

/// A ChallengeProvider backed by a [`MockZone`]
pub struct MockChallengeProvider {
    domain: DomainName,
    token: ValidationToken,
    api_key: String,
    log: Arc<dyn LogSink>,
    zone: Arc<MockZone>,
}

#[async_trait::async_trait]
impl ChallengeProvider for MockChallengeProvider {
    fn domain(&self) -> &DomainName {
        &self.domain
    }

    async fn add_or_update_record(&self, set_null: bool) -> Outcome {
        self.zone.calls.fetch_add(1, Ordering::SeqCst);

        let authorization = format!("mock-key {}", self.api_key);
        dump_request(
            &*self.log,
            if set_null { "Deleting DNS record" } else { "Writing DNS record" },
            "https://dns.mock.test/records",
            [
                ("Authorization", authorization.as_str()),
                ("Accept", "application/json"),
            ],
            None,
        );

        if let Some(outcome) = self.zone.scripted.lock().unwrap().pop_front()
            && outcome != Outcome::Success
        {
            return outcome;
        }

        let name = self.domain.challenge_record_name();
        let mut records = self.zone.records.lock().unwrap();
        if set_null {
            if records.remove(&name).is_none() {
                return Outcome::Failure;
            }
            self.zone.deletions.fetch_add(1, Ordering::SeqCst);
        } else if records
            .insert(name, self.token.as_str().to_string())
            .is_some()
        {
            self.zone.updates.fetch_add(1, Ordering::SeqCst);
        } else {
            self.zone.creations.fetch_add(1, Ordering::SeqCst);
        }
        Outcome::Success
    }

    fn provider_name(&self) -> &'static str {
        MOCK_PROVIDER
    }
}

/// Factory that requires `API_KEY`, like the real providers
pub struct MockFactory {
    zone: Arc<MockZone>,
}

impl ChallengeProviderFactory for MockFactory {
    fn create(&self, context: ProviderContext) -> Result<Box<dyn ChallengeProvider>> {
        self.zone.constructed.fetch_add(1, Ordering::SeqCst);
        let api_key = context.keychain.require(keys::API_KEY)?.to_string();
        Ok(Box::new(MockChallengeProvider {
            domain: context.domain,
            token: context.token,
            api_key,
            log: context.log,
            zone: Arc::clone(&self.zone),
        }))
    }
}

/// Registry with only the mock provider registered
pub fn mock_registry(zone: &Arc<MockZone>) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    registry.register_provider(
        MOCK_PROVIDER,
        Box::new(MockFactory {
            zone: Arc::clone(zone),
        }),
    );
    registry
}

/// Configuration selecting the mock provider with valid credentials
pub fn mock_config() -> HookConfig {
    HookConfig::new(MOCK_PROVIDER)
        .with_keychain(MOCK_PROVIDER, Keychain::new().with(keys::API_KEY, MOCK_API_KEY))
}
