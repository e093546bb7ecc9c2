//! # Supervisor configuration.
//!
//! Provides [`Config`], the settings of one [`Supervisor`](crate::Supervisor).
//!
//! Nothing here is read from files or the environment; callers build a
//! `Config` in code.

use crate::error::StopReason;
use crate::signals::Signal;

/// Settings for the run supervisor.
///
/// ## Field semantics
/// - `signals`: signals that cancel the root context (empty = no signal handling)
/// - `clean_shutdown_on_cause`: treat a main routine that returns the root
///   context's cause as a clean exit
/// - `stop_reason`: reason recorded when the main routine returns first
///
/// # Example
/// ```
/// use appvisor::{Config, Signal};
///
/// let mut cfg = Config::default();
/// cfg.signals.push(Signal::TERMINATE);
/// cfg.clean_shutdown_on_cause = false;
///
/// assert_eq!(cfg.signals, vec![Signal::INTERRUPT, Signal::TERMINATE]);
/// ```
#[derive(Clone, Debug)]
pub struct Config {
    /// Signals the root context subscribes to.
    ///
    /// Duplicates are ignored. Signals that cannot be registered on this
    /// platform are logged and skipped.
    pub signals: Vec<Signal>,

    /// Whether returning the context's own cancellation cause counts as success.
    ///
    /// - `true`: the main routine noticed cancellation and propagated the cause
    ///   verbatim, exit code `0`
    /// - `false`: the outcome is classified like any other error (logged, then
    ///   `128 + N` for a signal cause or `1` otherwise)
    pub clean_shutdown_on_cause: bool,

    /// Reason recorded on the root context when the main routine returns
    /// before any signal arrived.
    pub stop_reason: StopReason,
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `signals = [SIGINT]`
    /// - `clean_shutdown_on_cause = true`
    /// - `stop_reason = "main returned"`
    fn default() -> Self {
        Self {
            signals: vec![Signal::INTERRUPT],
            clean_shutdown_on_cause: true,
            stop_reason: StopReason::main_returned(),
        }
    }
}
