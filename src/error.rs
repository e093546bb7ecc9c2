//! Error and cause types shared by the root context and the run supervisor.
//!
//! This module defines three values that can travel through an error chain:
//!
//! - [`SignalReceived`] - a subscribed OS signal cancelled the context.
//! - [`StopReason`] - the owner stopped the context explicitly.
//! - [`Cause`] - the tagged union recorded by a [`Context`](crate::Context).
//!
//! All three compare structurally, so a main routine may construct its own copy
//! (or wrap the recorded one with `anyhow::Context`) and still be recognized by
//! the supervisor.

use std::borrow::Cow;

use thiserror::Error;

use crate::signals::Signal;

/// # A subscribed OS signal was delivered.
///
/// Recorded as [`Cause::Signal`] by the root context listener. A main routine
/// may also return it (wrapped or not) to report that it terminated because of
/// a signal; the supervisor then exits with `128 + signal number`.
///
/// # Example
/// ```
/// use appvisor::{Signal, SignalReceived};
///
/// let err = SignalReceived::new(Signal::INTERRUPT);
/// assert_eq!(err.to_string(), "signal received: SIGINT");
/// assert_eq!(err.exit_code(), 130);
/// ```
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[error("signal received: {signal}")]
pub struct SignalReceived {
    /// The signal that was delivered.
    pub signal: Signal,
}

impl SignalReceived {
    /// Wraps a signal identity.
    pub const fn new(signal: Signal) -> Self {
        Self { signal }
    }

    /// Conventional shell exit code for a process terminated by this signal.
    ///
    /// Falls back to [`EXIT_FAILURE`](crate::EXIT_FAILURE) for numbers outside
    /// `1..=127`.
    pub fn exit_code(&self) -> i32 {
        self.signal.exit_code().unwrap_or(crate::EXIT_FAILURE)
    }
}

/// # Caller-supplied reason for an explicit stop.
///
/// Compared by value: two separately constructed reasons with the same text are
/// the same reason.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
#[error("{reason}")]
pub struct StopReason {
    reason: Cow<'static, str>,
}

impl StopReason {
    /// Creates a reason from any string-like value.
    pub fn new(reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The reason the supervisor records when the main routine returns.
    pub const fn main_returned() -> Self {
        Self {
            reason: Cow::Borrowed("main returned"),
        }
    }

    /// Returns the reason text.
    pub fn as_str(&self) -> &str {
        &self.reason
    }
}

impl From<&'static str> for StopReason {
    fn from(reason: &'static str) -> Self {
        Self::new(reason)
    }
}

impl From<String> for StopReason {
    fn from(reason: String) -> Self {
        Self::new(reason)
    }
}

/// # Why a context was cancelled.
///
/// A context that is not cancelled has no cause (`Option::None`). Once recorded,
/// a cause never changes.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum Cause {
    /// A subscribed OS signal arrived.
    #[error(transparent)]
    Signal(#[from] SignalReceived),

    /// The owner called [`Stop::stop`](crate::Stop::stop).
    #[error(transparent)]
    Stopped(#[from] StopReason),

    /// The parent was cancelled without recording a cause of its own.
    #[error("context canceled")]
    Canceled,
}

impl Cause {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use appvisor::{Cause, StopReason};
    ///
    /// let cause = Cause::from(StopReason::main_returned());
    /// assert_eq!(cause.as_label(), "cause_stopped");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            Cause::Signal(_) => "cause_signal",
            Cause::Stopped(_) => "cause_stopped",
            Cause::Canceled => "cause_canceled",
        }
    }

    /// Returns the signal when this cause is [`Cause::Signal`].
    pub fn signal(&self) -> Option<Signal> {
        match self {
            Cause::Signal(s) => Some(s.signal),
            _ => None,
        }
    }

    /// Reports whether `err` (or anything in its source chain) is this cause.
    ///
    /// Accepts a [`Cause`], a bare [`SignalReceived`] or a bare [`StopReason`]
    /// anywhere in the chain. Comparison is by value.
    pub fn is_carried_by(&self, err: &anyhow::Error) -> bool {
        err.chain().any(|e| {
            if let Some(c) = e.downcast_ref::<Cause>() {
                return c == self;
            }
            match self {
                Cause::Signal(expected) => e.downcast_ref::<SignalReceived>() == Some(expected),
                Cause::Stopped(expected) => e.downcast_ref::<StopReason>() == Some(expected),
                Cause::Canceled => false,
            }
        })
    }
}

/// Finds the first signal marker in `err`'s source chain.
///
/// Both a bare [`SignalReceived`] and a [`Cause::Signal`] count.
pub(crate) fn find_signal(err: &anyhow::Error) -> Option<SignalReceived> {
    err.chain().find_map(|e| {
        e.downcast_ref::<SignalReceived>()
            .copied()
            .or_else(|| match e.downcast_ref::<Cause>() {
                Some(Cause::Signal(s)) => Some(*s),
                _ => None,
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context as _;

    #[test]
    fn test_signal_cause_matches_bare_marker() {
        let cause = Cause::from(SignalReceived::new(Signal::INTERRUPT));
        let err = anyhow::Error::new(SignalReceived::new(Signal::INTERRUPT));
        assert!(cause.is_carried_by(&err));
    }

    #[test]
    fn test_stop_cause_matches_separately_built_reason() {
        let cause = Cause::from(StopReason::new(String::from("shutting down")));
        let err = anyhow::Error::new(StopReason::from("shutting down"));
        assert!(cause.is_carried_by(&err));
    }

    #[test]
    fn test_wrapped_cause_is_found_in_chain() {
        let cause = Cause::from(StopReason::from("bye"));
        let err = Err::<(), _>(cause.clone())
            .context("draining queue")
            .context("worker loop")
            .unwrap_err();
        assert!(cause.is_carried_by(&err));
    }

    #[test]
    fn test_different_signal_is_not_the_cause() {
        let cause = Cause::from(SignalReceived::new(Signal::INTERRUPT));
        let err = anyhow::Error::new(SignalReceived::new(Signal::TERMINATE));
        assert!(!cause.is_carried_by(&err));
    }

    #[test]
    fn test_canceled_only_matches_itself() {
        assert!(Cause::Canceled.is_carried_by(&anyhow::Error::new(Cause::Canceled)));
        assert!(!Cause::Canceled.is_carried_by(&anyhow::anyhow!("context canceled")));
    }

    #[test]
    fn test_find_signal_through_cause_and_context() {
        let err = Err::<(), _>(Cause::from(SignalReceived::new(Signal::TERMINATE)))
            .context("server stopped")
            .unwrap_err();
        assert_eq!(
            find_signal(&err),
            Some(SignalReceived::new(Signal::TERMINATE))
        );
        assert_eq!(find_signal(&anyhow::anyhow!("boom")), None);
    }

    #[test]
    fn test_out_of_range_signal_exits_with_failure() {
        assert_eq!(SignalReceived::new(Signal::TERMINATE).exit_code(), 143);
        assert_eq!(SignalReceived::new(Signal::from_raw(i32::MAX)).exit_code(), 1);
        assert_eq!(SignalReceived::new(Signal::from_raw(-200)).exit_code(), 1);
    }

    #[test]
    fn test_display() {
        let cause = Cause::from(StopReason::main_returned());
        assert_eq!(cause.to_string(), "main returned");
        assert_eq!(
            Cause::from(SignalReceived::new(Signal::from_raw(42))).to_string(),
            "signal received: signal 42"
        );
    }
}
