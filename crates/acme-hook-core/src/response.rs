//! Interpreting provider responses
//!
//! Each provider documents what its status codes mean. A [`ResponseTable`]
//! holds that mapping so the log says more than a bare number.

use crate::traits::{LogSink, Outcome};

/// Status code → human-readable diagnostic for one provider
#[derive(Debug, Clone, Copy)]
pub struct ResponseTable {
    entries: &'static [(u16, &'static str)],
    fallback: &'static str,
}

impl ResponseTable {
    /// Build a table; `fallback` is used for unmapped codes
    pub const fn new(entries: &'static [(u16, &'static str)], fallback: &'static str) -> Self {
        Self { entries, fallback }
    }

    /// Diagnostic for a status code
    pub fn describe(&self, status: u16) -> &'static str {
        self.entries
            .iter()
            .find(|(code, _)| *code == status)
            .map(|(_, message)| *message)
            .unwrap_or(self.fallback)
    }

    /// Diagnostic for a response that could not be read at all
    pub fn not_understood(&self) -> &'static str {
        self.fallback
    }
}

/// Log the status of a response and turn it into an [`Outcome`]
///
/// 200–399 is success, anything else is failure.
pub fn check_response(log: &dyn LogSink, status: u16, table: &ResponseTable) -> Outcome {
    log.log(&format!(
        "[REQUEST STATUS (CODE {})] {}",
        status,
        table.describe(status)
    ));
    Outcome::from_status(status)
}

/// Pull `result[0].id` out of a list response
///
/// Absence of a result, or a body that isn't the expected JSON, yields
/// `None`. Callers treat `None` as a normal answer.
pub fn first_result_id(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    json.get("result")?
        .as_array()?
        .first()?
        .get("id")?
        .as_str()
        .map(str::to_string)
}
