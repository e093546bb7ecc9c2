//! # Logging collaborator.
//!
//! The supervisor reports failures through the [`Log`] trait rather than a
//! concrete logger, so callers can route the single failure line wherever
//! their process logs go.
//!
//! - [`Log`] - `log(severity, message)` extension point
//! - [`Severity`] - message severity, [`Severity::Critical`] for failed mains
//! - [`TracingLog`] - default implementation forwarding to `tracing`

mod log;
mod tracing_log;

pub use log::{Log, Severity};
pub use tracing_log::TracingLog;
