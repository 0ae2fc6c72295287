//! Configuration types for the certbot hook
//!
//! The core never reads files or the environment. The binary builds a
//! [`HookConfig`] and passes it in.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Shortest allowed propagation wait (seconds)
pub const MIN_PROPAGATION_WAIT_SECS: u64 = 30;

/// Longest allowed propagation wait (seconds)
pub const MAX_PROPAGATION_WAIT_SECS: u64 = 600;

/// Well-known keychain field names
pub mod keys {
    /// API key (GoDaddy, CloudFlare global key)
    pub const API_KEY: &str = "API_KEY";
    /// API secret (GoDaddy)
    pub const API_SECRET: &str = "API_SECRET";
    /// Account email (CloudFlare global key auth)
    pub const API_EMAIL: &str = "API_EMAIL";
    /// Scoped API token (CloudFlare bearer auth)
    pub const API_TOKEN: &str = "API_TOKEN";
}

/// Clamp a propagation wait into `[30, 600]` seconds
pub fn clamp_propagation_wait(secs: u64) -> u64 {
    secs.clamp(MIN_PROPAGATION_WAIT_SECS, MAX_PROPAGATION_WAIT_SECS)
}

/// Credentials for one provider
///
/// A flat map of field name to secret value. The Debug implementation lists
/// field names only.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keychain(HashMap<String, String>);

impl Keychain {
    /// Create an empty keychain
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    /// Set a field
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    /// Get a non-empty field
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Get a field the provider cannot work without
    pub fn require(&self, field: &str) -> Result<&str, crate::Error> {
        self.get(field)
            .ok_or_else(|| crate::Error::config(format!("missing credential field {}", field)))
    }

    /// Whether no fields are set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Keychain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields: Vec<&String> = self.0.keys().collect();
        fields.sort();
        f.debug_struct("Keychain")
            .field("fields", &fields)
            .field("values", &"<REDACTED>")
            .finish()
    }
}

/// Main hook configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookConfig {
    /// Registry identifier of the DNS provider (e.g., "godaddy")
    pub provider: String,

    /// Credentials keyed by provider identifier
    #[serde(default)]
    pub keychains: HashMap<String, Keychain>,

    /// Directory holding the per-domain log files
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Log to the console and shorten the propagation wait
    #[serde(default)]
    pub debug: bool,

    /// Seconds to wait after publishing a record (clamped to [30, 600])
    #[serde(default = "default_propagation_wait_secs")]
    pub propagation_wait_secs: u64,

    /// Seconds to wait in debug mode
    #[serde(default = "default_debug_wait_secs")]
    pub debug_wait_secs: u64,

    /// Extra attempts when a mutation is indeterminate (0 disables retry)
    #[serde(default)]
    pub max_retries: usize,

    /// Delay between attempts (in seconds)
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// Timeout for each provider HTTP request (in seconds)
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Override for the provider's API base URL
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Exit non-zero when the DNS mutation does not succeed
    #[serde(default)]
    pub strict_exit: bool,
}

impl HookConfig {
    /// Create a configuration with defaults for the given provider
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            keychains: HashMap::new(),
            log_dir: default_log_dir(),
            debug: false,
            propagation_wait_secs: default_propagation_wait_secs(),
            debug_wait_secs: default_debug_wait_secs(),
            max_retries: 0,
            retry_delay_secs: default_retry_delay_secs(),
            http_timeout_secs: default_http_timeout_secs(),
            api_base_url: None,
            strict_exit: false,
        }
    }

    /// Parse a configuration from JSON
    ///
    /// Missing optional fields take their defaults; `provider` is required.
    pub fn from_json(text: &str) -> Result<Self, crate::Error> {
        Ok(serde_json::from_str(text)?)
    }

    /// Set the keychain for a provider
    pub fn with_keychain(mut self, provider: impl Into<String>, keychain: Keychain) -> Self {
        self.keychains.insert(provider.into(), keychain);
        self
    }

    /// Keychain of the configured provider
    pub fn keychain(&self) -> Result<&Keychain, crate::Error> {
        self.keychains.get(&self.provider).ok_or_else(|| {
            crate::Error::config(format!("no credentials configured for provider '{}'", self.provider))
        })
    }

    /// How long the orchestrator sleeps after a successful auth mutation
    pub fn propagation_wait(&self) -> Duration {
        if self.debug {
            Duration::from_secs(self.debug_wait_secs)
        } else {
            Duration::from_secs(clamp_propagation_wait(self.propagation_wait_secs))
        }
    }

    /// Delay between retry attempts
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    /// Timeout for provider HTTP requests
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.provider.is_empty() {
            return Err(crate::Error::config("provider cannot be empty"));
        }

        if self.http_timeout_secs == 0 {
            return Err(crate::Error::config("http_timeout_secs must be > 0"));
        }

        if self.max_retries > 10 {
            return Err(crate::Error::config(format!(
                "max_retries must be between 0 and 10. Got: {}",
                self.max_retries
            )));
        }

        if !(1..=300).contains(&self.retry_delay_secs) {
            return Err(crate::Error::config(format!(
                "retry_delay_secs must be between 1 and 300 seconds. Got: {}",
                self.retry_delay_secs
            )));
        }

        if let Some(url) = &self.api_base_url
            && !url.starts_with("https://")
            && !url.starts_with("http://")
        {
            return Err(crate::Error::config(format!(
                "api_base_url must use HTTP or HTTPS scheme. Got: {}",
                url
            )));
        }

        Ok(())
    }
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("/tmp")
}

fn default_propagation_wait_secs() -> u64 {
    MIN_PROPAGATION_WAIT_SECS
}

fn default_debug_wait_secs() -> u64 {
    2
}

fn default_retry_delay_secs() -> u64 {
    5
}

fn default_http_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_propagation_wait() {
        assert_eq!(clamp_propagation_wait(10), 30);
        assert_eq!(clamp_propagation_wait(1000), 600);
        assert_eq!(clamp_propagation_wait(45), 45);
        assert_eq!(clamp_propagation_wait(30), 30);
        assert_eq!(clamp_propagation_wait(600), 600);
    }

    #[test]
    fn test_propagation_wait_debug_override() {
        let mut config = HookConfig::new("godaddy");
        config.propagation_wait_secs = 10;
        assert_eq!(config.propagation_wait(), Duration::from_secs(30));

        config.debug = true;
        assert_eq!(config.propagation_wait(), Duration::from_secs(2));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config = HookConfig::from_json(
            r#"{
                "provider": "cloudflare",
                "keychains": {
                    "cloudflare": { "API_KEY": "k", "API_EMAIL": "ops@example.com" }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.provider, "cloudflare");
        assert_eq!(config.log_dir, PathBuf::from("/tmp"));
        assert_eq!(config.propagation_wait_secs, 30);
        assert_eq!(config.max_retries, 0);
        assert!(!config.debug);
        assert_eq!(config.keychain().unwrap().get(keys::API_EMAIL), Some("ops@example.com"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_requires_provider() {
        let result = HookConfig::from_json(r#"{ "debug": true }"#);
        assert!(matches!(result, Err(crate::Error::Json(_))));
    }

    #[test]
    fn test_keychain_require() {
        let keychain = Keychain::new().with(keys::API_KEY, "k").with(keys::API_SECRET, "");
        assert_eq!(keychain.require(keys::API_KEY).unwrap(), "k");
        assert!(keychain.require(keys::API_SECRET).is_err());
        assert!(keychain.require(keys::API_EMAIL).is_err());
    }

    #[test]
    fn test_keychain_debug_hides_values() {
        let keychain = Keychain::new().with(keys::API_KEY, "super-secret-value");
        let debug = format!("{:?}", keychain);
        assert!(debug.contains("API_KEY"));
        assert!(!debug.contains("super-secret-value"));
    }

    #[test]
    fn test_missing_keychain() {
        let config = HookConfig::new("godaddy");
        assert!(config.keychain().is_err());
    }

    #[test]
    fn test_validate_ranges() {
        let mut config = HookConfig::new("godaddy");
        config.max_retries = 11;
        assert!(config.validate().is_err());

        let mut config = HookConfig::new("godaddy");
        config.retry_delay_secs = 0;
        assert!(config.validate().is_err());

        let mut config = HookConfig::new("godaddy");
        config.http_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = HookConfig::new("godaddy");
        config.api_base_url = Some("ftp://example.com".to_string());
        assert!(config.validate().is_err());

        assert!(HookConfig::new("").validate().is_err());
    }
}
