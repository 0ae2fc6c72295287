//! Request diagnostics with secret redaction
//!
//! Providers describe every request in the per-domain log: the action, the
//! URL, each header, and the payload. Headers in [`OBSCURED_HEADERS`] are
//! always written as [`REDACTED_PLACEHOLDER`], verbose mode included.

use crate::traits::LogSink;

/// Headers whose values never reach any log
pub const OBSCURED_HEADERS: &[&str] = &["Authorization", "X-Auth-Key"];

/// Fixed-length stand-in for an obscured value
pub const REDACTED_PLACEHOLDER: &str = "*****************************";

/// Whether a header is in the obscured set (case-insensitive)
pub fn is_obscured(name: &str) -> bool {
    OBSCURED_HEADERS
        .iter()
        .any(|obscured| obscured.eq_ignore_ascii_case(name))
}

/// The value to log for a header
pub fn redact_header<'a>(name: &str, value: &'a str) -> &'a str {
    if is_obscured(name) {
        REDACTED_PLACEHOLDER
    } else {
        value
    }
}

/// Log a request about to be sent
///
/// # Example output
///
/// ```text
/// Writing DNS record at: https://api.godaddy.com/v1/domains/example.com/records/TXT/_acme-challenge
/// HEADERS:
/// -- Authorization: *****************************
/// -- Accept: application/json
/// PAYLOAD:[{"data":"token","ttl":3600}]
/// ```
pub fn dump_request<'h, I>(log: &dyn LogSink, action: &str, url: &str, headers: I, payload: Option<&str>)
where
    I: IntoIterator<Item = (&'h str, &'h str)>,
{
    log.log(&format!("{} at: {}", action, url));
    log.log("HEADERS:");
    for (name, value) in headers {
        log.log(&format!("-- {}: {}", name, redact_header(name, value)));
    }
    if let Some(payload) = payload {
        log.log(&format!("PAYLOAD:{}", payload));
    }
}

/// Log a raw response body (verbose mode only)
pub fn dump_response(log: &dyn LogSink, body: &str) {
    log.debug(&format!("[RESPONSE DATA (plain-text)] {}", body));
}
