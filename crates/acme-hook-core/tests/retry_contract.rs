//! Contract Test: Retry of Indeterminate Mutations
//!
//! Constraints verified:
//! - Indeterminate outcomes are retried up to max_retries times
//! - A definite Failure is never retried
//! - max_retries = 0 (the default) disables retry
//! - Retries wait retry_delay plus at most half of it again between attempts

mod common;

use acme_hook_core::{HookPhase, Invocation, MemoryLog, Outcome, ValidationOrchestrator};
use common::*;
use std::sync::Arc;
use tokio::time::Instant;

async fn run(zone: &Arc<MockZone>, max_retries: usize) -> (Outcome, Arc<MemoryLog>) {
    let registry = mock_registry(zone);
    let mut config = mock_config();
    config.debug = true;
    config.debug_wait_secs = 0;
    config.max_retries = max_retries;
    config.retry_delay_secs = 5;

    let log = Arc::new(MemoryLog::new());
    let mut orchestrator = ValidationOrchestrator::with_log(
        Invocation::dns("example.com", "tok", HookPhase::Auth),
        &config,
        &registry,
        log.clone(),
    )
    .unwrap();
    (orchestrator.run().await, log)
}

#[tokio::test(start_paused = true)]
async fn indeterminate_is_retried_until_success() {
    let zone = MockZone::new();
    zone.script([Outcome::Indeterminate, Outcome::Indeterminate]);

    let start = Instant::now();
    let (outcome, log) = run(&zone, 3).await;

    assert_eq!(outcome, Outcome::Success);
    assert_eq!(zone.calls(), 3);
    assert_eq!(zone.record_count(), 1);
    let elapsed = start.elapsed().as_secs_f64();
    assert!(
        (10.0..=15.0).contains(&elapsed),
        "two jittered retry delays of 5s, got {}s",
        elapsed
    );
    assert!(log.contains("Retrying (1/3)"));
    assert!(log.contains("Retrying (2/3)"));
}

#[tokio::test(start_paused = true)]
async fn retries_are_bounded() {
    let zone = MockZone::new();
    zone.script([Outcome::Indeterminate; 5]);

    let (outcome, _) = run(&zone, 2).await;

    assert_eq!(outcome, Outcome::Indeterminate);
    assert_eq!(zone.calls(), 3, "one attempt plus two retries");
}

#[tokio::test(start_paused = true)]
async fn failure_is_never_retried() {
    let zone = MockZone::new();
    zone.script([Outcome::Failure]);

    let (outcome, log) = run(&zone, 5).await;

    assert_eq!(outcome, Outcome::Failure);
    assert_eq!(zone.calls(), 1);
    assert!(!log.contains("Retrying"));
}

#[tokio::test(start_paused = true)]
async fn zero_retries_disables_retry() {
    let zone = MockZone::new();
    zone.script([Outcome::Indeterminate]);

    let (outcome, _) = run(&zone, 0).await;

    assert_eq!(outcome, Outcome::Indeterminate);
    assert_eq!(zone.calls(), 1);
}
