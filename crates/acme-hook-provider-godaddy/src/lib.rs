// # GoDaddy DNS Provider
//
// Publishes `_acme-challenge` TXT records through the GoDaddy Domains API v1.
//
// ## Behaviour
//
// - One PUT per call, replacing every TXT record under the challenge name
// - Auth writes the validation token, cleanup writes the literal `null`
// - Non-success statuses become `Outcome::Failure`
// - Transport errors become `Outcome::Indeterminate`
// - No retry and no propagation wait (owned by `ValidationOrchestrator`)
//
// ## Known Limitation
//
// Cleanup neutralizes the record instead of removing it. The v1 API offers
// no per-record delete for a name that may hold several TXT values, so the
// record is left in place with `null` content.
//
// ## API Reference
//
// - Replace records: PUT `/v1/domains/{domain}/records/TXT/{name}`
// - Auth header: `Authorization: sso-key {key}:{secret}`

use acme_hook_core::config::keys;
use acme_hook_core::diagnostics::{dump_request, dump_response};
use acme_hook_core::response::{ResponseTable, check_response};
use acme_hook_core::traits::{
    ChallengeProvider, ChallengeProviderFactory, LogSink, Outcome, ProviderContext,
};
use acme_hook_core::{DomainName, Error, ProviderRegistry, Result, ValidationToken};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// Registry identifier
pub const PROVIDER_NAME: &str = "godaddy";

/// GoDaddy production API base URL
const GODADDY_API_BASE: &str = "https://api.godaddy.com";

/// TTL of the published record (seconds)
const RECORD_TTL: u32 = 3600;

/// Content written on cleanup
const NULL_CONTENT: &str = "null";

/// Status codes documented for record PUTs
static RESPONSE_TABLE: ResponseTable = ResponseTable::new(
    &[
        (200, "The request was successful."),
        (400, "The request was malformed."),
        (401, "The authentication information provided with the request was not valid."),
        (403, "The authenticated user does not have access to issue the request."),
        (404, "The targeted resource could not be found."),
        (422, "The request object does not fulfill the GoDaddy record schema for this type."),
        (429, "Too many requests at this time. Please try again later."),
        (500, "Internal server error: GoDaddy could not process the request."),
        (504, "The gateway timed out."),
    ],
    "The response to the request was not understood. Failure is assumed.",
);

/// One element of the PUT body
#[derive(Debug, Serialize)]
struct TxtRecord<'a> {
    data: &'a str,
    ttl: u32,
}

/// GoDaddy challenge provider
///
/// Bound to one FQDN and one validation token.
///
/// # Security
///
/// The `Authorization` header carries the API key and secret. It is logged
/// as a placeholder and hidden from `Debug` output.
pub struct GoDaddyProvider {
    domain: DomainName,
    token: ValidationToken,

    /// API base URL without a trailing slash
    base_url: String,

    /// Request headers, in the order they are logged
    /// ⚠️ contains the API secret
    headers: Vec<(&'static str, String)>,

    log: Arc<dyn LogSink>,
    client: reqwest::Client,
}

impl std::fmt::Debug for GoDaddyProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoDaddyProvider")
            .field("domain", &self.domain)
            .field("base_url", &self.base_url)
            .field("authorization", &"<REDACTED>")
            .finish()
    }
}

impl GoDaddyProvider {
    /// Create a client from a provider context
    ///
    /// # Errors
    ///
    /// - `Error::Config`: `API_KEY` or `API_SECRET` is missing, or the HTTP
    ///   client cannot be built
    pub fn new(context: ProviderContext) -> Result<Self> {
        let authorization = format!(
            "sso-key {}:{}",
            context.keychain.require(keys::API_KEY)?,
            context.keychain.require(keys::API_SECRET)?
        );

        let client = reqwest::Client::builder()
            .timeout(context.http_timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {}", e)))?;

        let base_url = context
            .api_base_url
            .as_deref()
            .unwrap_or(GODADDY_API_BASE)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            domain: context.domain,
            token: context.token,
            base_url,
            headers: vec![
                ("Authorization", authorization),
                ("Accept", "application/json".to_string()),
                ("Content-Type", "application/json".to_string()),
            ],
            log: context.log,
            client,
        })
    }

    /// URL of the TXT record set for the challenge name
    ///
    /// ```text
    /// {base}/v1/domains/example.com/records/TXT/_acme-challenge.www
    /// ```
    pub fn record_url(&self) -> String {
        format!(
            "{}/v1/domains/{}/records/TXT/{}",
            self.base_url,
            self.domain.base_domain(),
            self.domain.relative_challenge_name()
        )
    }

    fn header_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(|(name, value)| (*name, value.as_str()))
    }
}

#[async_trait]
impl ChallengeProvider for GoDaddyProvider {
    fn domain(&self) -> &DomainName {
        &self.domain
    }

    async fn add_or_update_record(&self, set_null: bool) -> Outcome {
        let url = self.record_url();
        let content = if set_null {
            NULL_CONTENT
        } else {
            self.token.as_str()
        };

        let payload = match serde_json::to_string(&[TxtRecord {
            data: content,
            ttl: RECORD_TTL,
        }]) {
            Ok(payload) => payload,
            Err(e) => {
                self.log
                    .log(&format!("Could not encode the record payload: {}", e));
                return Outcome::Failure;
            }
        };

        dump_request(
            &*self.log,
            "Writing DNS record",
            &url,
            self.header_pairs(),
            Some(&payload),
        );

        let mut request = self.client.put(&url).body(payload);
        for (name, value) in self.header_pairs() {
            request = request.header(name, value);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("GoDaddy request failed for {}: {}", self.domain, e);
                self.log.log(&format!(
                    "The request could not be completed: {}. {}",
                    e,
                    RESPONSE_TABLE.not_understood()
                ));
                return Outcome::Indeterminate;
            }
        };

        let status = response.status().as_u16();
        match response.text().await {
            Ok(body) => dump_response(&*self.log, &body),
            Err(e) => tracing::debug!("Could not read GoDaddy response body: {}", e),
        }

        let outcome = check_response(&*self.log, status, &RESPONSE_TABLE);
        tracing::debug!(
            "GoDaddy PUT {} -> {} ({})",
            self.domain.challenge_record_name(),
            status,
            outcome
        );
        outcome
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Factory for creating GoDaddy providers
pub struct GoDaddyFactory;

impl ChallengeProviderFactory for GoDaddyFactory {
    fn create(&self, context: ProviderContext) -> Result<Box<dyn ChallengeProvider>> {
        Ok(Box::new(GoDaddyProvider::new(context)?))
    }
}

/// Register the GoDaddy provider with a registry
///
/// # Example
///
/// ```rust
/// use acme_hook_core::ProviderRegistry;
///
/// let mut registry = ProviderRegistry::new();
/// acme_hook_provider_godaddy::register(&mut registry);
/// assert!(registry.has_provider("godaddy"));
/// ```
pub fn register(registry: &mut ProviderRegistry) {
    registry.register_provider(PROVIDER_NAME, Box::new(GoDaddyFactory));
}
