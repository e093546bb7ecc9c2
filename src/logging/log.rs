//! # Log trait.
//!
//! ## Example
//! ```rust
//! use std::sync::Mutex;
//! use appvisor::{Log, Severity};
//!
//! #[derive(Default)]
//! struct Memory(Mutex<Vec<String>>);
//!
//! impl Log for Memory {
//!     fn log(&self, severity: Severity, message: &str) {
//!         self.0.lock().unwrap().push(format!("[{severity}] {message}"));
//!     }
//! }
//!
//! let log = Memory::default();
//! log.log(Severity::Critical, "error in main: boom");
//! assert_eq!(log.0.lock().unwrap()[0], "[critical] error in main: boom");
//! ```

use std::fmt;

/// Message severity, ordered from least to most severe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    /// Used for the failure line of a main routine.
    Critical,
}

impl Severity {
    /// Returns a short stable label (lowercase) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Sink for supervisor log messages.
///
/// ### Implementation requirements
/// - Must not block for long; it is called on the supervisor's exit path.
/// - Handle errors internally; do not panic.
pub trait Log: Send + Sync + 'static {
    /// Writes one message.
    fn log(&self, severity: Severity, message: &str);
}
