//! # Outcome classification and exit codes.
//!
//! An [`Outcome`] is what the main routine left behind: its error (if any) and
//! the root context's cause at the moment it returned. [`Outcome::verdict`]
//! turns that pair into a [`Verdict`] with an exit code.
//!
//! ## Decision
//! ```text
//! error == None                                ─► Success        (0)
//! cause is carried by error (policy enabled)   ─► CleanShutdown  (0)
//! error chain carries SignalReceived{sig}      ─► SignalFailure  (128 + sig)   logged
//! otherwise                                    ─► Failure        (1)           logged
//! ```

use std::backtrace::BacktraceStatus;

use crate::error::{Cause, find_signal};
use crate::signals::Signal;

/// Exit code for success and clean shutdown.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for a generic failure.
pub const EXIT_FAILURE: i32 = 1;

/// What the main routine returned, plus the root context's cause at that time.
#[derive(Debug)]
pub struct Outcome {
    /// Error returned by the main routine.
    pub error: Option<anyhow::Error>,
    /// Cause recorded by the root context when the main routine returned.
    pub cause: Option<Cause>,
}

/// Classified outcome.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// The main routine returned `Ok(())`.
    Success,
    /// The main routine returned the cancellation cause it was asked to honor.
    CleanShutdown,
    /// The main routine reported it terminated because of a signal.
    SignalFailure(Signal),
    /// Any other error.
    Failure,
}

impl Verdict {
    /// Returns the process exit code for this verdict.
    ///
    /// A signal failure whose number is outside `1..=127` exits with
    /// [`EXIT_FAILURE`].
    ///
    /// # Example
    /// ```
    /// use appvisor::{Signal, Verdict};
    ///
    /// assert_eq!(Verdict::CleanShutdown.exit_code(), 0);
    /// assert_eq!(Verdict::SignalFailure(Signal::INTERRUPT).exit_code(), 130);
    /// assert_eq!(Verdict::Failure.exit_code(), 1);
    /// ```
    pub fn exit_code(&self) -> i32 {
        match self {
            Verdict::Success | Verdict::CleanShutdown => EXIT_SUCCESS,
            Verdict::SignalFailure(signal) => signal.exit_code().unwrap_or(EXIT_FAILURE),
            Verdict::Failure => EXIT_FAILURE,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Verdict::Success => "success",
            Verdict::CleanShutdown => "clean_shutdown",
            Verdict::SignalFailure(_) => "signal_failure",
            Verdict::Failure => "failure",
        }
    }

    /// Whether the outcome must be reported as a failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, Verdict::SignalFailure(_) | Verdict::Failure)
    }
}

impl Outcome {
    /// Captures the main routine's result together with the root context's
    /// cause at the time it returned.
    pub fn new(result: anyhow::Result<()>, cause: Option<Cause>) -> Self {
        Self {
            error: result.err(),
            cause,
        }
    }

    /// Classifies the outcome.
    ///
    /// `clean_shutdown_on_cause` enables the cause-equivalence check; see
    /// [`Config::clean_shutdown_on_cause`](crate::Config::clean_shutdown_on_cause).
    pub fn verdict(&self, clean_shutdown_on_cause: bool) -> Verdict {
        let Some(err) = &self.error else {
            return Verdict::Success;
        };
        if clean_shutdown_on_cause
            && self
                .cause
                .as_ref()
                .is_some_and(|cause| cause.is_carried_by(err))
        {
            return Verdict::CleanShutdown;
        }
        match find_signal(err) {
            Some(received) => Verdict::SignalFailure(received.signal),
            None => Verdict::Failure,
        }
    }

    /// Renders the failure line: the error with its context chain, followed by
    /// the backtrace when one was captured.
    ///
    /// Returns `None` when there is no error.
    pub fn failure_message(&self) -> Option<String> {
        let err = self.error.as_ref()?;
        let backtrace = err.backtrace();
        let rendered = match backtrace.status() {
            BacktraceStatus::Captured => format!("\n{backtrace}"),
            _ => String::new(),
        };
        Some(format!("error in main: {err:#}{rendered}"))
    }
}

#[cfg(test)]
mod tests {
    use anyhow::{Context as _, anyhow};

    use super::*;
    use crate::error::{SignalReceived, StopReason};

    fn sigint() -> Cause {
        Cause::from(SignalReceived::new(Signal::INTERRUPT))
    }

    #[test]
    fn test_ok_is_success() {
        assert_eq!(Outcome::new(Ok(()), None).verdict(true), Verdict::Success);
        assert_eq!(
            Outcome::new(Ok(()), Some(sigint())).verdict(true),
            Verdict::Success
        );
    }

    #[test]
    fn test_returning_cause_is_clean_for_every_kind() {
        let causes = [
            sigint(),
            Cause::from(StopReason::from("reload")),
            Cause::Canceled,
        ];
        for cause in causes {
            let outcome = Outcome::new(Err(cause.clone().into()), Some(cause.clone()));
            assert_eq!(outcome.verdict(true), Verdict::CleanShutdown, "{cause:?}");
            assert_eq!(outcome.verdict(true).exit_code(), 0);
        }
    }

    #[test]
    fn test_signal_marker_maps_to_128_plus() {
        let err = anyhow!(SignalReceived::new(Signal::INTERRUPT)).context("listener");
        let outcome = Outcome::new(Err(err), None);
        assert_eq!(outcome.verdict(true), Verdict::SignalFailure(Signal::INTERRUPT));
        assert_eq!(outcome.verdict(true).exit_code(), 130);
    }

    #[test]
    fn test_bogus_signal_number_exits_with_failure() {
        for raw in [i32::MAX, -200, 0] {
            let err = anyhow!(SignalReceived::new(Signal::from_raw(raw)));
            let verdict = Outcome::new(Err(err), None).verdict(true);
            assert_eq!(verdict, Verdict::SignalFailure(Signal::from_raw(raw)));
            assert_eq!(verdict.exit_code(), EXIT_FAILURE, "raw {raw}");
            assert!(verdict.is_failure());
        }
    }

    #[test]
    fn test_signal_marker_differs_from_cause() {
        let err = anyhow!(SignalReceived::new(Signal::TERMINATE));
        let outcome = Outcome::new(Err(err), Some(sigint()));
        assert_eq!(outcome.verdict(true).exit_code(), 143);
    }

    #[test]
    fn test_policy_disabled_classifies_cause_as_error() {
        let outcome = Outcome::new(Err(sigint().into()), Some(sigint()));
        assert_eq!(outcome.verdict(false), Verdict::SignalFailure(Signal::INTERRUPT));

        let stop = Cause::from(StopReason::main_returned());
        let outcome = Outcome::new(Err(stop.clone().into()), Some(stop));
        assert_eq!(outcome.verdict(false), Verdict::Failure);
    }

    #[test]
    fn test_unrelated_error_is_failure() {
        let err = Err::<(), _>(anyhow!("disk full")).context("writing snapshot");
        let outcome = Outcome::new(err, Some(sigint()));
        assert_eq!(outcome.verdict(true), Verdict::Failure);
        assert!(outcome.verdict(true).is_failure());

        let msg = outcome.failure_message().unwrap();
        assert!(msg.starts_with("error in main: writing snapshot: disk full"));
    }

    #[test]
    fn test_no_message_without_error() {
        assert!(Outcome::new(Ok(()), None).failure_message().is_none());
    }
}
