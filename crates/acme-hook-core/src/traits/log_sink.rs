// # Log Sink Trait
//
// The per-domain validation log, injected into the orchestrator and every
// provider client.
//
// ## Implementations
//
// - `DomainLog`: append-only `certbot-<base_domain>.log`, or the console in
//   debug mode
// - `MemoryLog`: captures lines in memory (tests, embedding)

/// Destination for validation diagnostics
///
/// Writes are infallible from the caller's point of view: a sink that fails
/// to write reports it through `tracing` and carries on.
pub trait LogSink: Send + Sync {
    /// Write one message
    ///
    /// `debug_only` lines (raw response bodies) are only kept when the sink
    /// is verbose.
    fn write(&self, message: &str, debug_only: bool);

    /// Write a line that is always kept
    fn log(&self, message: &str) {
        self.write(message, false);
    }

    /// Write a line that is only kept in verbose mode
    fn debug(&self, message: &str) {
        self.write(message, true);
    }

    /// Print a line for the operator running certbot, immediately
    fn console(&self, line: &str) {
        println!("{}", line);
    }

    /// Flush buffered lines
    fn flush(&self) {}
}
