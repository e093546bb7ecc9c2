//! # TracingLog: forwards supervisor messages to `tracing`.
//!
//! `tracing` has no critical level, so [`Severity::Critical`] is emitted at
//! `ERROR` with a `severity = "critical"` field to keep it distinguishable.
//!
//! ## Example output (with `tracing_subscriber::fmt`)
//! ```text
//! ERROR appvisor: error in main: connecting to db: connection refused severity="critical"
//! ```

use super::log::{Log, Severity};

/// Default [`Log`] implementation.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLog;

impl TracingLog {
    /// Construct a new [`TracingLog`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Log for TracingLog {
    fn log(&self, severity: Severity, message: &str) {
        let label = severity.as_label();
        match severity {
            Severity::Debug => tracing::debug!(severity = label, "{message}"),
            Severity::Info => tracing::info!(severity = label, "{message}"),
            Severity::Warning => tracing::warn!(severity = label, "{message}"),
            Severity::Error | Severity::Critical => {
                tracing::error!(severity = label, "{message}")
            }
        }
    }
}
