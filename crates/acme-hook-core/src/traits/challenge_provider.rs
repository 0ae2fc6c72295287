// # Challenge Provider Trait
//
// Defines the interface for publishing and removing `_acme-challenge` TXT
// records through a DNS provider's REST API.
//
// ## Implementations
//
// - GoDaddy: `acme-hook-provider-godaddy` crate
// - CloudFlare: `acme-hook-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use acme_hook_core::ChallengeProvider;
//
// async fn publish(provider: &dyn ChallengeProvider) {
//     let outcome = provider.add_or_update_record(false).await;
//     if !outcome.is_success() {
//         // Failure and Indeterminate are handled the same way
//     }
// }
// ```

use crate::config::Keychain;
use crate::domain::DomainName;
use crate::invocation::ValidationToken;
use crate::traits::LogSink;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Result of one DNS mutation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The provider accepted the change
    Success,
    /// The provider rejected the change, or a required ID was not found
    Failure,
    /// No usable answer (timeout, connection error, unreadable response)
    ///
    /// Never assumed successful.
    Indeterminate,
}

impl Outcome {
    /// Only [`Outcome::Success`] counts as success
    pub fn is_success(self) -> bool {
        self == Outcome::Success
    }

    /// Map an HTTP status code: 200–399 succeed, everything else fails
    pub fn from_status(status: u16) -> Self {
        if (200..400).contains(&status) {
            Outcome::Success
        } else {
            Outcome::Failure
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => f.write_str("success"),
            Outcome::Failure => f.write_str("failure"),
            Outcome::Indeterminate => f.write_str("indeterminate"),
        }
    }
}

/// Everything a provider client needs to be constructed
///
/// Built by the orchestrator from the invocation and configuration.
#[derive(Clone)]
pub struct ProviderContext {
    /// Credentials for the selected provider
    pub keychain: Keychain,
    /// The decomposed FQDN
    pub domain: DomainName,
    /// Record content for the auth phase
    pub token: ValidationToken,
    /// Per-domain log
    pub log: Arc<dyn LogSink>,
    /// Override for the provider's API base URL (sandboxes, tests)
    pub api_base_url: Option<String>,
    /// Timeout applied to every HTTP request
    pub http_timeout: Duration,
}

impl fmt::Debug for ProviderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderContext")
            .field("keychain", &self.keychain)
            .field("domain", &self.domain)
            .field("token", &self.token)
            .field("api_base_url", &self.api_base_url)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

/// Trait for DNS provider clients
///
/// One client is bound to one FQDN and one validation token for the
/// lifetime of an invocation.
///
/// # Construction
///
/// Constructing a client decomposes the FQDN and prepares headers. It must
/// not perform network I/O. A missing credential field is the only error a
/// client may raise, and only at construction.
///
/// # Error Reporting
///
/// Providers never return errors from [`add_or_update_record`]. Non-success
/// statuses become [`Outcome::Failure`], transport errors become
/// [`Outcome::Indeterminate`], and each is accompanied by a line in the
/// per-domain log.
///
/// # Allowed Capabilities
/// - ✅ HTTP/HTTPS calls to the provider's own API
/// - ✅ Writing diagnostics to the injected [`LogSink`]
///
/// # Forbidden Capabilities
/// - ❌ Retry or backoff (owned by `ValidationOrchestrator`)
/// - ❌ Sleeping for propagation (owned by `ValidationOrchestrator`)
/// - ❌ Logging credential values in any mode
///
/// [`add_or_update_record`]: ChallengeProvider::add_or_update_record
#[async_trait]
pub trait ChallengeProvider: Send + Sync {
    /// The FQDN this client is bound to, already decomposed
    fn domain(&self) -> &DomainName;

    /// Publish the validation record, or tear it down
    ///
    /// # Parameters
    ///
    /// - `set_null`: `false` for the auth phase (publish the token), `true`
    ///   for cleanup (remove or neutralize the record)
    ///
    /// # Idempotency
    ///
    /// Publishing the same token twice must leave the provider in the same
    /// state as publishing it once (update, never duplicate).
    ///
    /// # Returns
    ///
    /// The [`Outcome`] of the single mutating request, or `Failure` when a
    /// required identifier could not be resolved first.
    async fn add_or_update_record(&self, set_null: bool) -> Outcome;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing providers from a [`ProviderContext`]
pub trait ChallengeProviderFactory: Send + Sync {
    /// Create a provider client
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn ChallengeProvider>)`: a client ready for one request
    /// - `Err(Error::Config)`: a required credential field is missing
    fn create(&self, context: ProviderContext) -> crate::Result<Box<dyn ChallengeProvider>>;
}
