// Settings for the certbot hook binary
//
// certbot runs the hook with whatever environment it was started with, so
// everything comes from `CERTBOT_HOOK_*` variables. A JSON file named by
// `CERTBOT_HOOK_CONFIG` can hold the full `HookConfig` (including keychains
// for several providers); variables set alongside it win.

use acme_hook_core::HookConfig;
use acme_hook_core::config::keys;
use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Prefix of every variable read by the hook
pub const ENV_PREFIX: &str = "CERTBOT_HOOK_";

/// Provider used when neither the file nor the environment names one
const DEFAULT_PROVIDER: &str = "godaddy";

/// Default tracing level (stderr stays quiet for certbot)
const DEFAULT_LOG_LEVEL: &str = "warn";

/// Credential fields copied from the environment into the selected keychain
const CREDENTIAL_FIELDS: [&str; 4] = [
    keys::API_KEY,
    keys::API_SECRET,
    keys::API_EMAIL,
    keys::API_TOKEN,
];

/// Everything the binary needs before it can run the orchestrator
#[derive(Debug)]
pub struct Settings {
    pub config: HookConfig,
    pub log_level: String,
}

impl Settings {
    /// Load settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load settings through a variable lookup function
    ///
    /// `lookup` receives full variable names (`CERTBOT_HOOK_PROVIDER`, ...).
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(&format!("{}{}", ENV_PREFIX, name)).filter(|value| !value.trim().is_empty())
        };

        let mut config = match var("CONFIG") {
            Some(path) => load_file(Path::new(&path))?,
            None => HookConfig::new(DEFAULT_PROVIDER),
        };

        if let Some(provider) = var("PROVIDER") {
            config.provider = provider.trim().to_ascii_lowercase();
        }

        for field in CREDENTIAL_FIELDS {
            if let Some(value) = var(field) {
                config
                    .keychains
                    .entry(config.provider.clone())
                    .or_default()
                    .insert(field, value);
            }
        }

        if let Some(dir) = var("LOG_DIR") {
            config.log_dir = dir.into();
        }
        if let Some(url) = var("API_BASE_URL") {
            config.api_base_url = Some(url);
        }
        if let Some(debug) = var("DEBUG") {
            config.debug = parse_bool("DEBUG", &debug)?;
        }
        if let Some(strict) = var("STRICT_EXIT") {
            config.strict_exit = parse_bool("STRICT_EXIT", &strict)?;
        }
        if let Some(secs) = var("PROPAGATION_WAIT_SECS") {
            config.propagation_wait_secs = parse_number("PROPAGATION_WAIT_SECS", &secs)?;
        }
        if let Some(retries) = var("MAX_RETRIES") {
            config.max_retries = parse_number("MAX_RETRIES", &retries)?;
        }
        if let Some(secs) = var("RETRY_DELAY_SECS") {
            config.retry_delay_secs = parse_number("RETRY_DELAY_SECS", &secs)?;
        }
        if let Some(secs) = var("HTTP_TIMEOUT_SECS") {
            config.http_timeout_secs = parse_number("HTTP_TIMEOUT_SECS", &secs)?;
        }

        let log_level = var("LOG_LEVEL")
            .map(|level| level.trim().to_ascii_lowercase())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
        match log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "{}LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                ENV_PREFIX,
                log_level
            ),
        }

        config.validate()?;
        config
            .keychain()
            .with_context(|| {
                format!(
                    "set {0}API_KEY and the other credential variables, or point {0}CONFIG at a config file",
                    ENV_PREFIX
                )
            })?;

        Ok(Self { config, log_level })
    }
}

fn load_file(path: &Path) -> Result<HookConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read config file {}", path.display()))?;
    HookConfig::from_json(&text)
        .with_context(|| format!("invalid config file {}", path.display()))
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("{}{} must be true or false. Got: {}", ENV_PREFIX, name, other),
    }
}

fn parse_number<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("{}{} must be a whole number. Got: {}", ENV_PREFIX, name, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| (format!("{}{}", ENV_PREFIX, name), value.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_godaddy_from_env() {
        let settings = Settings::from_lookup(lookup(&[
            ("API_KEY", "key"),
            ("API_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(settings.config.provider, "godaddy");
        assert_eq!(settings.log_level, "warn");
        let keychain = settings.config.keychain().unwrap();
        assert_eq!(keychain.get(keys::API_KEY), Some("key"));
        assert_eq!(keychain.get(keys::API_SECRET), Some("secret"));
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            ("PROVIDER", "CloudFlare"),
            ("API_TOKEN", "token"),
            ("LOG_DIR", "/var/log/certbot-hook"),
            ("DEBUG", "yes"),
            ("PROPAGATION_WAIT_SECS", "120"),
            ("MAX_RETRIES", "2"),
            ("STRICT_EXIT", "1"),
            ("LOG_LEVEL", "DEBUG"),
        ]))
        .unwrap();

        let config = &settings.config;
        assert_eq!(config.provider, "cloudflare");
        assert_eq!(config.log_dir, Path::new("/var/log/certbot-hook"));
        assert!(config.debug);
        assert!(config.strict_exit);
        assert_eq!(config.propagation_wait_secs, 120);
        assert_eq!(config.max_retries, 2);
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_missing_credentials() {
        let err = Settings::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("API_KEY"));
    }

    #[test]
    fn test_invalid_values() {
        let base = [("API_KEY", "key")];
        for bad in [
            ("DEBUG", "maybe"),
            ("MAX_RETRIES", "three"),
            ("MAX_RETRIES", "50"),
            ("LOG_LEVEL", "verbose"),
            ("API_BASE_URL", "ftp://example.com"),
        ] {
            let mut vars = base.to_vec();
            vars.push(bad);
            assert!(
                Settings::from_lookup(lookup(&vars)).is_err(),
                "expected error for {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_config_file_with_env_overlay() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "provider": "cloudflare",
                "keychains": {{
                    "cloudflare": {{ "API_EMAIL": "ops@example.com", "API_KEY": "file-key" }},
                    "godaddy": {{ "API_KEY": "gd", "API_SECRET": "gd-secret" }}
                }},
                "propagation_wait_secs": 90
            }}"#
        )
        .unwrap();
        let path = file.path().to_string_lossy().to_string();

        let settings = Settings::from_lookup(lookup(&[
            ("CONFIG", path.as_str()),
            ("API_KEY", "env-key"),
        ]))
        .unwrap();

        let config = &settings.config;
        assert_eq!(config.provider, "cloudflare");
        assert_eq!(config.propagation_wait_secs, 90);
        let keychain = config.keychain().unwrap();
        assert_eq!(keychain.get(keys::API_KEY), Some("env-key"));
        assert_eq!(keychain.get(keys::API_EMAIL), Some("ops@example.com"));
    }

    #[test]
    fn test_unreadable_config_file() {
        let err = Settings::from_lookup(lookup(&[("CONFIG", "/nonexistent/hook.json")]))
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/hook.json"));
    }
}
