//! Core traits for the certbot hook
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`ChallengeProvider`]: Publish and remove validation records via provider APIs
//! - [`LogSink`]: Per-domain validation log

pub mod challenge_provider;
pub mod log_sink;

pub use challenge_provider::{ChallengeProvider, ChallengeProviderFactory, Outcome, ProviderContext};
pub use log_sink::LogSink;
