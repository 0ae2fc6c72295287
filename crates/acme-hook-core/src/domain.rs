//! Domain name model
//!
//! A [`DomainName`] is the FQDN certbot asked us to validate, split into the
//! registrable base domain (`label.tld`) and whatever sits beneath it.
//! Provider clients need both halves: GoDaddy addresses records relative to
//! the base domain, CloudFlare looks zones up by it.

use crate::error::{Error, Result};
use std::fmt;

/// Prefix of every TXT record used for DNS-01 validation
pub const CHALLENGE_PREFIX: &str = "_acme-challenge";

/// A validated FQDN, decomposed into base domain and subdomain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainName {
    fqdn: String,
    base_domain: String,
    subdomain: String,
}

impl DomainName {
    /// Validate and decompose an FQDN
    ///
    /// The base domain is the last two labels when the final label is at
    /// least two ASCII alphanumerics. Otherwise the whole name is used as
    /// the base domain and the subdomain is empty.
    ///
    /// # Example
    ///
    /// ```rust
    /// use acme_hook_core::DomainName;
    ///
    /// let domain = DomainName::parse("www.shop.example.com").unwrap();
    /// assert_eq!(domain.base_domain(), "example.com");
    /// assert_eq!(domain.subdomain(), "www.shop");
    /// ```
    pub fn parse(fqdn: &str) -> Result<Self> {
        let fqdn = fqdn.trim().trim_end_matches('.');
        validate(fqdn)?;

        let labels: Vec<&str> = fqdn.split('.').collect();
        let (base_domain, subdomain) = match labels.as_slice() {
            [rest @ .., label, tld] if is_tld(tld) && !label.is_empty() => {
                (format!("{}.{}", label, tld), rest.join("."))
            }
            _ => (fqdn.to_string(), String::new()),
        };

        Ok(Self {
            fqdn: fqdn.to_string(),
            base_domain,
            subdomain,
        })
    }

    /// The full name as given (without a trailing root dot)
    pub fn fqdn(&self) -> &str {
        &self.fqdn
    }

    /// The registrable root, e.g. `example.com`
    pub fn base_domain(&self) -> &str {
        &self.base_domain
    }

    /// Labels beneath the base domain, dot-joined; empty for an apex name
    pub fn subdomain(&self) -> &str {
        &self.subdomain
    }

    /// Whether the name has labels beneath the base domain
    pub fn has_subdomain(&self) -> bool {
        !self.subdomain.is_empty()
    }

    /// Challenge record name relative to the base domain
    ///
    /// `_acme-challenge` for an apex name, `_acme-challenge.<subdomain>`
    /// otherwise.
    pub fn relative_challenge_name(&self) -> String {
        if self.has_subdomain() {
            format!("{}.{}", CHALLENGE_PREFIX, self.subdomain)
        } else {
            CHALLENGE_PREFIX.to_string()
        }
    }

    /// Fully qualified challenge record name, `_acme-challenge.<fqdn>`
    pub fn challenge_record_name(&self) -> String {
        format!("{}.{}", CHALLENGE_PREFIX, self.fqdn)
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fqdn)
    }
}

fn is_tld(label: &str) -> bool {
    label.len() >= 2 && label.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Basic RFC 1035 checks. Underscores are accepted because certbot can be
/// pointed at service-style labels.
fn validate(fqdn: &str) -> Result<()> {
    if fqdn.is_empty() {
        return Err(Error::invalid_domain("domain name cannot be empty"));
    }

    if fqdn.len() > 253 {
        return Err(Error::invalid_domain(format!(
            "domain name too long: {} chars (max 253)",
            fqdn.len()
        )));
    }

    for label in fqdn.split('.') {
        if label.is_empty() {
            return Err(Error::invalid_domain(format!(
                "domain name has an empty label: '{}'",
                fqdn
            )));
        }

        if label.len() > 63 {
            return Err(Error::invalid_domain(format!(
                "domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            )));
        }

        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(Error::invalid_domain(format!(
                "domain label contains invalid characters: '{}'",
                label
            )));
        }
    }

    Ok(())
}
