//! Contract Test: Propagation Wait
//!
//! Constraints verified:
//! - A successful auth sleeps for the configured wait, clamped to [30, 600]
//! - Debug mode uses the short debug wait instead
//! - Cleanup and failed mutations do not wait at all
//!
//! Time is paused, so the sleeps complete instantly while the virtual clock
//! still records how far it advanced.

mod common;

use acme_hook_core::{HookConfig, HookPhase, Invocation, MemoryLog, Outcome, ValidationOrchestrator};
use common::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

async fn measure(config: &HookConfig, phase: HookPhase, zone: &Arc<MockZone>) -> (Outcome, Duration) {
    let registry = mock_registry(zone);
    let mut orchestrator = ValidationOrchestrator::with_log(
        Invocation::dns("example.com", "tok", phase),
        config,
        &registry,
        Arc::new(MemoryLog::new()),
    )
    .unwrap();

    let start = Instant::now();
    let outcome = orchestrator.run().await;
    (outcome, start.elapsed())
}

async fn auth_wait(propagation_wait_secs: u64) -> Duration {
    let mut config = mock_config();
    config.propagation_wait_secs = propagation_wait_secs;
    let (outcome, elapsed) = measure(&config, HookPhase::Auth, &MockZone::new()).await;
    assert_eq!(outcome, Outcome::Success);
    elapsed
}

#[tokio::test(start_paused = true)]
async fn default_wait_is_thirty_seconds() {
    let (outcome, elapsed) = measure(&mock_config(), HookPhase::Auth, &MockZone::new()).await;
    assert_eq!(outcome, Outcome::Success);
    assert_eq!(elapsed.as_secs(), 30);
}

#[tokio::test(start_paused = true)]
async fn configured_wait_is_clamped() {
    assert_eq!(auth_wait(10).await.as_secs(), 30);
    assert_eq!(auth_wait(45).await.as_secs(), 45);
    assert_eq!(auth_wait(1000).await.as_secs(), 600);
}

#[tokio::test(start_paused = true)]
async fn debug_mode_uses_short_wait() {
    let mut config = mock_config();
    config.debug = true;
    config.propagation_wait_secs = 300;

    let (outcome, elapsed) = measure(&config, HookPhase::Auth, &MockZone::new()).await;
    assert_eq!(outcome, Outcome::Success);
    assert_eq!(elapsed.as_secs(), 2);
}

#[tokio::test(start_paused = true)]
async fn cleanup_does_not_wait() {
    let zone = MockZone::new();
    zone.seed("_acme-challenge.example.com", "tok");

    let (outcome, elapsed) = measure(&mock_config(), HookPhase::Cleanup, &zone).await;
    assert_eq!(outcome, Outcome::Success);
    assert_eq!(elapsed, Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn failure_does_not_wait() {
    let zone = MockZone::new();
    zone.script([Outcome::Failure]);

    let (outcome, elapsed) = measure(&mock_config(), HookPhase::Auth, &zone).await;
    assert_eq!(outcome, Outcome::Failure);
    assert_eq!(elapsed, Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn wait_is_announced_outside_debug_mode() {
    let zone = MockZone::new();
    let registry = mock_registry(&zone);
    let log = Arc::new(MemoryLog::new());

    let mut orchestrator = ValidationOrchestrator::with_log(
        Invocation::dns("example.com", "tok", HookPhase::Auth),
        &mock_config(),
        &registry,
        log.clone(),
    )
    .unwrap();
    orchestrator.run().await;

    assert_eq!(
        log.console_lines(),
        vec![
            "Waiting 30 seconds for the DNS changes to propagate. Please be patient.".to_string(),
            "[SUCCESS] The DNS changes were made for domain 'example.com'".to_string(),
        ]
    );
    assert!(log.contains("Waiting 30 seconds for DNS propagation"));
}
