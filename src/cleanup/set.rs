//! # Ordered cleanup execution with panic isolation.
//!
//! ```text
//! run_all()
//!   cleanup N ──► stop() ──► panic → logged at Warning, continue
//!   ...
//!   cleanup 1 ──► stop()
//! ```
//!
//! ## Rules
//! - Runs in **reverse registration order** (last registered, first stopped).
//! - Every cleanup runs, even if an earlier one panicked.
//! - Nothing is returned; failures never reach the exit code.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use super::step::CleanupRef;
use crate::logging::{Log, Severity};

/// Cleanup steps run by the supervisor after the main routine returns.
#[derive(Clone, Default)]
pub struct CleanupSet {
    steps: Vec<CleanupRef>,
}

impl CleanupSet {
    /// Creates a set from steps in registration order.
    #[must_use]
    pub fn new(steps: Vec<CleanupRef>) -> Self {
        Self { steps }
    }

    /// Registers one more step; it will run before all earlier ones.
    pub fn push(&mut self, step: CleanupRef) {
        self.steps.push(step);
    }

    /// Number of registered steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` when no step is registered.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs every step, newest first, logging panics to `log`.
    pub async fn run_all(&self, log: &Arc<dyn Log>) {
        for step in self.steps.iter().rev() {
            let fut = step.stop();
            if let Err(panic_err) = AssertUnwindSafe(fut).catch_unwind().await {
                let info = panic_message(&*panic_err);
                log.log(
                    Severity::Warning,
                    &format!("cleanup {:?} panicked: {info}", step.name()),
                );
            }
        }
    }
}

impl std::fmt::Debug for CleanupSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.steps.iter().map(|s| s.name()))
            .finish()
    }
}

/// Extracts a printable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
