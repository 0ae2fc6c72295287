//! Validation orchestrator
//!
//! The ValidationOrchestrator is responsible for:
//! - Binding a provider client to the invocation's domain via the registry
//! - Driving the client through create/update (auth) or delete (cleanup)
//! - Waiting for DNS propagation after a successful auth
//! - Reporting the outcome to the log and to the operator's console
//!
//! ## State Machine
//!
//! ```text
//! Constructed ──▶ Resolving ──▶ Mutating ──┬──▶ Propagating ──▶ Done(Success)
//!                                          │    (auth + Success only)
//!                                          ├──▶ Done(Success)   (cleanup)
//!                                          └──▶ Done(Failure | Indeterminate)
//! ```
//!
//! Cleanup never enters `Propagating`, and neither does a failed mutation.

use crate::config::{HookConfig, Keychain};
use crate::domain::DomainName;
use crate::error::Result;
use crate::invocation::{ChallengeType, Invocation};
use crate::log::DomainLog;
use crate::registry::ProviderRegistry;
use crate::traits::{ChallengeProvider, LogSink, Outcome, ProviderContext};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// States of one validation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationState {
    /// Client bound, nothing sent yet
    Constructed,
    /// Provider is resolving zone/record identifiers
    Resolving,
    /// Provider is creating, updating or deleting the record
    Mutating,
    /// Waiting for the record to propagate
    Propagating,
    /// Finished with the given outcome
    Done(Outcome),
}

/// Drives one certbot hook invocation
///
/// ## Lifecycle
///
/// 1. Create with [`ValidationOrchestrator::new()`] (fails before any
///    network I/O on bad input or configuration)
/// 2. Call [`ValidationOrchestrator::run()`] once
/// 3. Drop to flush and close the per-domain log
pub struct ValidationOrchestrator {
    /// The parsed hook invocation
    invocation: Invocation,

    /// Provider client bound to the invocation's domain
    provider: Box<dyn ChallengeProvider>,

    /// Per-domain log shared with the provider
    log: Arc<dyn LogSink>,

    /// Sleep after a successful auth mutation
    propagation_wait: Duration,

    /// Tell the operator about the wait (quiet in debug mode)
    announce_wait: bool,

    /// Extra attempts for indeterminate mutations
    max_retries: usize,

    /// Delay between attempts
    retry_delay: Duration,

    state: ValidationState,
    transitions: Vec<ValidationState>,
}

impl ValidationOrchestrator {
    /// Create an orchestrator logging to `certbot-<base_domain>.log`
    ///
    /// # Errors
    ///
    /// - `Error::Config`: invalid settings or missing credentials
    /// - `Error::InvalidDomain`: the FQDN does not validate
    /// - `Error::Io`: the log file cannot be opened
    /// - `Error::UnknownProvider`: the configured provider is not registered
    pub fn new(
        invocation: Invocation,
        config: &HookConfig,
        registry: &ProviderRegistry,
    ) -> Result<Self> {
        let (domain, keychain) = prepare(&invocation, config)?;
        let log = Arc::new(DomainLog::open(
            &config.log_dir,
            domain.base_domain(),
            config.debug,
        )?);
        Self::build(invocation, domain, keychain, config, registry, log)
    }

    /// Create an orchestrator writing to an injected log sink
    pub fn with_log(
        invocation: Invocation,
        config: &HookConfig,
        registry: &ProviderRegistry,
        log: Arc<dyn LogSink>,
    ) -> Result<Self> {
        let (domain, keychain) = prepare(&invocation, config)?;
        Self::build(invocation, domain, keychain, config, registry, log)
    }

    fn build(
        invocation: Invocation,
        domain: DomainName,
        keychain: Keychain,
        config: &HookConfig,
        registry: &ProviderRegistry,
        log: Arc<dyn LogSink>,
    ) -> Result<Self> {
        let base_domain = domain.base_domain().to_string();
        let context = ProviderContext {
            keychain,
            domain,
            token: invocation.token.clone(),
            log: Arc::clone(&log),
            api_base_url: config.api_base_url.clone(),
            http_timeout: config.http_timeout(),
        };
        let provider = registry.create_provider(&config.provider, context)?;

        log.log(&format!(
            "Validation worker constructed [{}]: {} ({}): {}, {}, {}",
            invocation.phase,
            invocation.domain,
            base_domain,
            invocation.token,
            invocation.challenge,
            invocation.http_token.as_deref().unwrap_or("{no-http-token}")
        ));
        debug!(
            "Bound {} provider to {} ({})",
            provider.provider_name(),
            invocation.domain,
            invocation.phase
        );

        Ok(Self {
            invocation,
            provider,
            log,
            propagation_wait: config.propagation_wait(),
            announce_wait: !config.debug,
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
            state: ValidationState::Constructed,
            transitions: vec![ValidationState::Constructed],
        })
    }

    /// Run the validation requested by the invocation
    pub async fn run(&mut self) -> Outcome {
        match self.invocation.challenge {
            ChallengeType::Dns => self.dns_validation().await,
            ChallengeType::Http => self.http_validation(),
        }
    }

    /// Create or remove the DNS-01 record
    ///
    /// On a successful auth this blocks for the propagation wait before
    /// returning, because certbot asks the ACME server to check the record
    /// as soon as the hook exits.
    pub async fn dns_validation(&mut self) -> Outcome {
        let phase = self.invocation.phase;
        self.log
            .log(&format!("=== New validation request (type: {}) ===", phase));

        self.transition(ValidationState::Resolving);
        self.transition(ValidationState::Mutating);
        let outcome = self.mutate(phase.is_cleanup()).await;
        let fqdn = self.provider.domain().fqdn().to_string();

        if !outcome.is_success() {
            let notice = format!("DNS validation has failed for domain '{}'", fqdn);
            warn!("{} ({})", notice, outcome);
            self.log.log(&notice);
            self.log.console(&format!("[FAILURE] {}", notice));
            return self.finish(outcome);
        }

        if !phase.is_cleanup() {
            self.transition(ValidationState::Propagating);
            self.wait_for_propagation().await;
        }

        let notice = format!("The DNS changes were made for domain '{}'", fqdn);
        info!("{}", notice);
        self.log.log(&notice);
        self.log.console(&format!("[SUCCESS] {}", notice));
        self.finish(outcome)
    }

    /// HTTP-01 is not implemented; nothing is changed
    pub fn http_validation(&mut self) -> Outcome {
        let notice = format!(
            "HTTP validation is not implemented; nothing was changed for domain '{}'",
            self.invocation.domain
        );
        warn!("{}", notice);
        self.log.log(&notice);
        self.finish(Outcome::Indeterminate)
    }

    /// Call the provider, retrying indeterminate outcomes when configured
    ///
    /// A definite `Failure` is never retried.
    async fn mutate(&self, set_null: bool) -> Outcome {
        let mut attempt = 0;
        loop {
            let outcome = self.provider.add_or_update_record(set_null).await;
            if outcome != Outcome::Indeterminate || attempt >= self.max_retries {
                return outcome;
            }

            attempt += 1;
            let delay = jittered(self.retry_delay);
            warn!(
                "Indeterminate response from {}, retrying ({}/{}) in {:?}",
                self.provider.provider_name(),
                attempt,
                self.max_retries,
                delay
            );
            self.log.log(&format!(
                "The request outcome could not be determined. Retrying ({}/{}).",
                attempt, self.max_retries
            ));
            tokio::time::sleep(delay).await;
        }
    }

    async fn wait_for_propagation(&self) {
        let secs = self.propagation_wait.as_secs();
        if self.announce_wait {
            self.log.console(&format!(
                "Waiting {} seconds for the DNS changes to propagate. Please be patient.",
                secs
            ));
        }
        self.log
            .log(&format!("Waiting {} seconds for DNS propagation", secs));
        tokio::time::sleep(self.propagation_wait).await;
    }

    fn transition(&mut self, next: ValidationState) {
        debug!("Validation state: {:?} -> {:?}", self.state, next);
        self.state = next;
        self.transitions.push(next);
    }

    fn finish(&mut self, outcome: Outcome) -> Outcome {
        self.transition(ValidationState::Done(outcome));
        self.log.flush();
        outcome
    }

    /// Current state
    pub fn state(&self) -> ValidationState {
        self.state
    }

    /// Every state entered so far, in order
    pub fn transitions(&self) -> &[ValidationState] {
        &self.transitions
    }

    /// The decomposed domain the provider is bound to
    pub fn domain(&self) -> &DomainName {
        self.provider.domain()
    }

    /// The parsed invocation
    pub fn invocation(&self) -> &Invocation {
        &self.invocation
    }

    /// Propagation wait that will follow a successful auth
    pub fn propagation_wait(&self) -> Duration {
        self.propagation_wait
    }

    /// Name of the bound provider
    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }
}

fn prepare(invocation: &Invocation, config: &HookConfig) -> Result<(DomainName, Keychain)> {
    config.validate()?;
    let domain = DomainName::parse(&invocation.domain)?;
    let keychain = config.keychain()?.clone();
    Ok((domain, keychain))
}

/// Retry delay plus up to half of it again, drawn fresh for each attempt
fn jittered(base: Duration) -> Duration {
    let max_jitter_ms = (base.as_millis() / 2) as u64;
    if max_jitter_ms == 0 {
        return base;
    }
    base + Duration::from_millis(rand::thread_rng().gen_range(0..=max_jitter_ms))
}
