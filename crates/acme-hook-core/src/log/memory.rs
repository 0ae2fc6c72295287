// # Memory Log
//
// In-memory implementation of LogSink.
//
// ## Purpose
//
// Captures log lines and console output instead of writing them anywhere.
// Useful for testing, and for embedding the orchestrator in a process that
// ships its own logging.

use std::sync::{Mutex, PoisonError};

use crate::traits::LogSink;

/// In-memory log sink
///
/// # Example
///
/// ```rust
/// use acme_hook_core::log::MemoryLog;
/// use acme_hook_core::traits::LogSink;
///
/// let log = MemoryLog::new();
/// log.log("kept");
/// log.debug("dropped unless verbose");
///
/// assert_eq!(log.lines(), vec!["kept".to_string()]);
/// ```
#[derive(Debug, Default)]
pub struct MemoryLog {
    verbose: bool,
    lines: Mutex<Vec<String>>,
    console: Mutex<Vec<String>>,
}

impl MemoryLog {
    /// A log that drops debug-only lines, like a file log
    pub fn new() -> Self {
        Self::default()
    }

    /// A log that keeps debug-only lines, like debug mode
    pub fn verbose() -> Self {
        Self {
            verbose: true,
            ..Self::default()
        }
    }

    /// Captured log lines
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Captured console output
    pub fn console_lines(&self) -> Vec<String> {
        self.console
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Log lines and console output joined with newlines
    pub fn contents(&self) -> String {
        let mut all = self.lines();
        all.extend(self.console_lines());
        all.join("\n")
    }

    /// Whether any log line or console line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.contents().contains(needle)
    }
}

impl LogSink for MemoryLog {
    fn write(&self, message: &str, debug_only: bool) {
        if debug_only && !self.verbose {
            return;
        }
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }

    fn console(&self, line: &str) {
        self.console
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}
