//! Parsing of the certbot hook invocation
//!
//! certbot hands the hook a single whitespace-joined argument:
//!
//! ```text
//! "<fqdn> <validation_token> {auth|cleanup} [http_token]"
//! ```
//!
//! Three fields mean a DNS-01 challenge, four mean HTTP-01.

use crate::error::{Error, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static INVOCATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:[-\w]+\.)*[a-z0-9-]+\.[a-z0-9]{2,}\s+\S+\s+(?:auth|cleanup)(?:\s+\S+)?$")
        .expect("invocation pattern is valid")
});

/// Hook phase requested by certbot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    /// Publish the validation record
    Auth,
    /// Remove (or neutralize) the validation record
    Cleanup,
}

impl HookPhase {
    /// Whether this phase tears the record down
    pub fn is_cleanup(self) -> bool {
        self == HookPhase::Cleanup
    }
}

impl FromStr for HookPhase {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auth" => Ok(HookPhase::Auth),
            "cleanup" => Ok(HookPhase::Cleanup),
            other => Err(Error::invocation(format!(
                "unknown hook phase '{}', expected 'auth' or 'cleanup'",
                other
            ))),
        }
    }
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookPhase::Auth => f.write_str("auth"),
            HookPhase::Cleanup => f.write_str("cleanup"),
        }
    }
}

/// Challenge type inferred from the number of fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeType {
    /// DNS-01: a TXT record under `_acme-challenge`
    Dns,
    /// HTTP-01: not implemented, the hook returns without acting
    Http,
}

impl fmt::Display for ChallengeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChallengeType::Dns => f.write_str("dns"),
            ChallengeType::Http => f.write_str("http"),
        }
    }
}

/// Opaque validation token supplied by certbot
///
/// Used verbatim as record content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationToken(String);

impl ValidationToken {
    /// Wrap a token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValidationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A parsed hook invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// FQDN to validate (decomposed later by the provider client)
    pub domain: String,
    /// Validation token for the TXT record
    pub token: ValidationToken,
    /// Auth or cleanup
    pub phase: HookPhase,
    /// DNS or HTTP challenge
    pub challenge: ChallengeType,
    /// Extra token present only for HTTP challenges
    pub http_token: Option<String>,
}

impl Invocation {
    /// Parse from the process arguments, excluding the program name
    ///
    /// Exactly one argument is accepted.
    pub fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let args: Vec<String> = args.into_iter().collect();
        match args.as_slice() {
            [single] => single.parse(),
            _ => Err(Error::invocation(format!(
                "expected exactly one argument, got {}",
                args.len()
            ))),
        }
    }

    /// Convenience constructor for a DNS challenge
    pub fn dns(domain: impl Into<String>, token: impl Into<String>, phase: HookPhase) -> Self {
        Self {
            domain: domain.into(),
            token: ValidationToken::new(token),
            phase,
            challenge: ChallengeType::Dns,
            http_token: None,
        }
    }
}

impl FromStr for Invocation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let line = s.trim();
        if !INVOCATION_PATTERN.is_match(line) {
            return Err(Error::invocation(
                "expected \"<fqdn> <token> {auth|cleanup} [http_token]\"",
            ));
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        let (domain, token, phase, http_token) = match fields.as_slice() {
            [domain, token, phase] => (*domain, *token, *phase, None),
            [domain, token, phase, http] => (*domain, *token, *phase, Some(http.to_string())),
            _ => {
                return Err(Error::invocation(format!(
                    "expected 3 or 4 fields, got {}",
                    fields.len()
                )));
            }
        };

        Ok(Self {
            domain: domain.to_string(),
            token: ValidationToken::new(token),
            phase: phase.parse()?,
            challenge: if http_token.is_some() {
                ChallengeType::Http
            } else {
                ChallengeType::Dns
            },
            http_token,
        })
    }
}
