//! Error types for the certbot hook
//!
//! Only fatal, pre-network failures are errors. Anything that goes wrong
//! while talking to a DNS provider is reported as an [`Outcome`] instead.
//!
//! [`Outcome`]: crate::traits::Outcome

use thiserror::Error;

/// Result type alias for hook operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the certbot hook
#[derive(Error, Debug)]
pub enum Error {
    /// The invoking process passed arguments of the wrong shape
    #[error("Invalid invocation: {0}")]
    Invocation(String),

    /// The FQDN could not be validated
    #[error("Invalid domain name: {0}")]
    InvalidDomain(String),

    /// Configuration errors (missing credentials, out-of-range settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The configured provider identifier has no registered factory
    #[error("Unknown provider type: {0}")]
    UnknownProvider(String),

    /// Log file I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invocation error
    pub fn invocation(msg: impl Into<String>) -> Self {
        Self::Invocation(msg.into())
    }

    /// Create an invalid domain error
    pub fn invalid_domain(msg: impl Into<String>) -> Self {
        Self::InvalidDomain(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an unknown provider error
    pub fn unknown_provider(name: impl Into<String>) -> Self {
        Self::UnknownProvider(name.into())
    }
}
