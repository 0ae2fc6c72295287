// # acme-hook-core
//
// Core library for the certbot DNS-01 manual hook.
//
// ## Architecture Overview
//
// This library provides the core functionality for answering DNS-01
// challenges from certbot's `--manual-auth-hook` / `--manual-cleanup-hook`:
// - **Invocation**: Parses the single argument certbot hands the hook
// - **DomainName**: Splits an FQDN into base domain and subdomain
// - **ChallengeProvider**: Trait for publishing/removing TXT records via provider APIs
// - **ProviderRegistry**: Plugin-based registry keyed by provider identifier
// - **ValidationOrchestrator**: State machine driving one auth or cleanup request
// - **LogSink**: The per-domain validation log
//
// ## Design Principles
//
// 1. **Request-scoped**: Everything lives for exactly one invocation
// 2. **Plugin-Based**: Providers register themselves, no hard-coded if-else
// 3. **Fail early**: Bad input and bad configuration fail before any network I/O
// 4. **No optimistic success**: Anything not understood counts as failure
// 5. **Secrets stay secret**: Credentials never reach a log, in any mode

pub mod config;
pub mod diagnostics;
pub mod domain;
pub mod engine;
pub mod error;
pub mod invocation;
pub mod log;
pub mod registry;
pub mod response;
pub mod traits;

// Re-export core types for convenience
pub use config::{HookConfig, Keychain};
pub use domain::DomainName;
pub use engine::{ValidationOrchestrator, ValidationState};
pub use error::{Error, Result};
pub use invocation::{ChallengeType, HookPhase, Invocation, ValidationToken};
pub use log::{DomainLog, MemoryLog};
pub use registry::ProviderRegistry;
pub use traits::{ChallengeProvider, ChallengeProviderFactory, LogSink, Outcome, ProviderContext};
