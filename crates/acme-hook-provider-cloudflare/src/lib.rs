// # CloudFlare DNS Provider
//
// Publishes and removes `_acme-challenge` TXT records through the CloudFlare
// API v4.
//
// ## Request Flow
//
// 1. Resolve the zone ID from the base domain (absent → `Failure`)
// 2. Resolve the ID of an existing challenge record (absence is normal)
// 3. Auth: POST a new record, or PUT over the existing one
// 4. Cleanup: DELETE the existing record, or refuse when there is none
//
// Updating in place keeps repeated auth calls from piling up duplicate
// records. Cleanup never guesses: without a record ID nothing is deleted.
//
// ## Authentication
//
// - `API_TOKEN` set: `Authorization: Bearer {token}`
// - otherwise: `X-Auth-Email` + `X-Auth-Key` (global API key)
//
// Both `Authorization` and `X-Auth-Key` are logged as a placeholder.
//
// ## API Reference
//
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?name=...&type=TXT`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`
// - Delete DNS Record: DELETE `/zones/:zone_id/dns_records/:record_id`

use acme_hook_core::config::keys;
use acme_hook_core::diagnostics::{dump_request, dump_response};
use acme_hook_core::response::{ResponseTable, check_response, first_result_id};
use acme_hook_core::traits::{
    ChallengeProvider, ChallengeProviderFactory, LogSink, Outcome, ProviderContext,
};
use acme_hook_core::{DomainName, Error, ProviderRegistry, Result, ValidationToken};
use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use std::sync::Arc;

/// Registry identifier
pub const PROVIDER_NAME: &str = "cloudflare";

/// CloudFlare API base URL
const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// TTL of the published record (seconds)
const RECORD_TTL: u32 = 120;

/// Status codes documented for the v4 API
static RESPONSE_TABLE: ResponseTable = ResponseTable::new(
    &[
        (200, "The request was successful."),
        (304, "The request was successful, but nothing has been modified."),
        (400, "The request was invalid or malformed."),
        (401, "The authenticated user does not have permission to access or modify the requested resource."),
        (403, "The request did not include information to authenticate a user."),
        (405, "The request used an invalid HTTP method to access or modify the requested resource."),
        (415, "The response is not a valid JSON object."),
        (429, "Too many requests at this time. Please try again later."),
    ],
    "The response to the request could not be understood. Assuming request failure.",
);

/// Body of a record create/update
#[derive(Debug, Serialize)]
struct TxtRecord<'a> {
    #[serde(rename = "type")]
    record_type: &'static str,
    name: &'a str,
    content: &'a str,
    ttl: u32,
}

/// CloudFlare challenge provider
///
/// Bound to one FQDN and one validation token. Zone and record IDs are
/// resolved on every call and never cached.
///
/// # Security
///
/// The Debug implementation does NOT expose the API key or token.
pub struct CloudflareProvider {
    domain: DomainName,
    token: ValidationToken,

    /// API base URL without a trailing slash
    base_url: String,

    /// Request headers, in the order they are logged
    /// ⚠️ contains the API key or token
    headers: Vec<(&'static str, String)>,

    log: Arc<dyn LogSink>,
    client: reqwest::Client,
}

// Custom Debug implementation that hides the credentials
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("domain", &self.domain)
            .field("base_url", &self.base_url)
            .field("credentials", &"<REDACTED>")
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a client from a provider context
    ///
    /// # Errors
    ///
    /// - `Error::Config`: neither `API_TOKEN` nor both `API_EMAIL` and
    ///   `API_KEY` are set, or the HTTP client cannot be built
    pub fn new(context: ProviderContext) -> Result<Self> {
        let mut headers = match context.keychain.get(keys::API_TOKEN) {
            Some(token) => vec![("Authorization", format!("Bearer {}", token))],
            None => vec![
                (
                    "X-Auth-Email",
                    context.keychain.require(keys::API_EMAIL)?.to_string(),
                ),
                (
                    "X-Auth-Key",
                    context.keychain.require(keys::API_KEY)?.to_string(),
                ),
            ],
        };
        headers.push(("Content-Type", "application/json".to_string()));
        headers.push(("Accept", "application/json".to_string()));

        let client = reqwest::Client::builder()
            .timeout(context.http_timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {}", e)))?;

        let base_url = context
            .api_base_url
            .as_deref()
            .unwrap_or(CLOUDFLARE_API_BASE)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            domain: context.domain,
            token: context.token,
            base_url,
            headers,
            log: context.log,
            client,
        })
    }

    fn header_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(|(name, value)| (*name, value.as_str()))
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        self.header_pairs()
            .fold(self.client.request(method, url), |request, (name, value)| {
                request.header(name, value)
            })
    }

    /// Run a lookup and return the first object's ID
    ///
    /// `Ok(None)` covers an empty result, a non-success status and a body
    /// that isn't the expected JSON. Only a transport failure is `Err`.
    async fn get_object_id(
        &self,
        message: &str,
        url: &str,
    ) -> std::result::Result<Option<String>, reqwest::Error> {
        dump_request(&*self.log, message, url, self.header_pairs(), None);

        let response = self.request(Method::GET, url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        dump_response(&*self.log, &body);

        if check_response(&*self.log, status, &RESPONSE_TABLE).is_success() {
            Ok(first_result_id(&body))
        } else {
            Ok(None)
        }
    }

    /// GET `/zones?name={base_domain}`
    async fn get_zone_id(&self) -> std::result::Result<Option<String>, reqwest::Error> {
        let url = format!("{}/zones?name={}", self.base_url, self.domain.base_domain());
        self.get_object_id("Requesting zone data", &url).await
    }

    /// GET `/zones/{zone}/dns_records?name=_acme-challenge.{fqdn}&type=TXT`
    async fn get_target_record_id(
        &self,
        zone_id: &str,
    ) -> std::result::Result<Option<String>, reqwest::Error> {
        let url = format!(
            "{}/zones/{}/dns_records?name={}&type=TXT",
            self.base_url,
            zone_id,
            self.domain.challenge_record_name()
        );
        self.get_object_id("Requesting record ID for the target (sub)domain", &url)
            .await
    }

    async fn write_record(&self, zone_id: &str, record_id: Option<String>) -> Outcome {
        let name = self.domain.challenge_record_name();
        let payload = match serde_json::to_string(&TxtRecord {
            record_type: "TXT",
            name: &name,
            content: self.token.as_str(),
            ttl: RECORD_TTL,
        }) {
            Ok(payload) => payload,
            Err(e) => {
                self.log
                    .log(&format!("Could not encode the record payload: {}", e));
                return Outcome::Failure;
            }
        };

        let records_url = format!("{}/zones/{}/dns_records", self.base_url, zone_id);
        let (method, url) = match record_id {
            Some(id) => (Method::PUT, format!("{}/{}", records_url, id)),
            None => (Method::POST, records_url),
        };

        dump_request(
            &*self.log,
            "Writing DNS record",
            &url,
            self.header_pairs(),
            Some(&payload),
        );
        self.execute(self.request(method, &url).body(payload)).await
    }

    async fn delete_record(&self, zone_id: &str, record_id: Option<String>) -> Outcome {
        let Some(record_id) = record_id else {
            self.log.log(&format!(
                "No TXT record was found for {}. Refusing to delete anything.",
                self.domain.challenge_record_name()
            ));
            return Outcome::Failure;
        };

        let url = format!(
            "{}/zones/{}/dns_records/{}",
            self.base_url, zone_id, record_id
        );
        dump_request(
            &*self.log,
            "Deleting DNS record",
            &url,
            self.header_pairs(),
            None,
        );
        self.execute(self.request(Method::DELETE, &url)).await
    }

    /// Send a mutating request and interpret its status
    async fn execute(&self, request: reqwest::RequestBuilder) -> Outcome {
        match request.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                match response.text().await {
                    Ok(body) => dump_response(&*self.log, &body),
                    Err(e) => tracing::debug!("Could not read CloudFlare response body: {}", e),
                }
                check_response(&*self.log, status, &RESPONSE_TABLE)
            }
            Err(e) => self.transport_error(e),
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> Outcome {
        tracing::warn!("CloudFlare request failed for {}: {}", self.domain, e);
        self.log.log(&format!(
            "The request could not be completed: {}. {}",
            e,
            RESPONSE_TABLE.not_understood()
        ));
        Outcome::Indeterminate
    }
}

#[async_trait]
impl ChallengeProvider for CloudflareProvider {
    fn domain(&self) -> &DomainName {
        &self.domain
    }

    async fn add_or_update_record(&self, set_null: bool) -> Outcome {
        let zone_id = match self.get_zone_id().await {
            Ok(Some(zone_id)) => zone_id,
            Ok(None) => {
                self.log
                    .log("There was an error retrieving the ZoneID for the target domain.");
                return Outcome::Failure;
            }
            Err(e) => return self.transport_error(e),
        };
        self.log
            .log(&format!("CloudFlare ZoneID for the target: {}", zone_id));

        let record_id = match self.get_target_record_id(&zone_id).await {
            Ok(record_id) => record_id,
            Err(e) => return self.transport_error(e),
        };
        tracing::debug!(
            "CloudFlare record ID for {}: {:?}",
            self.domain.challenge_record_name(),
            record_id
        );

        if set_null {
            self.delete_record(&zone_id, record_id).await
        } else {
            self.write_record(&zone_id, record_id).await
        }
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Factory for creating CloudFlare providers
pub struct CloudflareFactory;

impl ChallengeProviderFactory for CloudflareFactory {
    fn create(&self, context: ProviderContext) -> Result<Box<dyn ChallengeProvider>> {
        Ok(Box::new(CloudflareProvider::new(context)?))
    }
}

/// Register the CloudFlare provider with a registry
///
/// # Example
///
/// ```rust
/// use acme_hook_core::ProviderRegistry;
///
/// let mut registry = ProviderRegistry::new();
/// acme_hook_provider_cloudflare::register(&mut registry);
/// assert!(registry.has_provider("cloudflare"));
/// ```
pub fn register(registry: &mut ProviderRegistry) {
    registry.register_provider(PROVIDER_NAME, Box::new(CloudflareFactory));
}
