//! # Cleanup collaborators.
//!
//! Work that must happen after the main routine returns, on every exit path:
//! flushing telemetry exporters, stopping profilers, removing pid files.
//!
//! - [`Cleanup`] - trait for a named async cleanup step
//! - [`CleanupFn`] - closure-backed implementation
//! - [`CleanupRef`] - shared handle (`Arc<dyn Cleanup>`)
//! - [`CleanupSet`] - ordered set run by the supervisor

mod cleanup_fn;
mod set;
mod step;

pub use cleanup_fn::CleanupFn;
pub use set::CleanupSet;
pub use step::{Cleanup, CleanupRef};
