//! # Cancellable execution contexts.
//!
//! A [`Context`] is a [`CancellationToken`] paired with a write-once
//! [`Cause`] slot. Cancelling records *why*; the first cause recorded wins.
//!
//! - [`Context::background`] is a root that is never cancelled by itself.
//! - [`Context::child`] derives a context that is cancelled with its parent.
//! - [`notify`] derives a root context that is also cancelled by OS signals.
//!
//! ## Cause resolution
//! ```text
//! cause():
//!   own slot set?            ─► that cause
//!   token cancelled?
//!     ├─ parent has cause    ─► parent's cause
//!     └─ otherwise           ─► Cause::Canceled
//!   not cancelled            ─► None
//! ```

mod notify;

pub use notify::{Stop, notify};

use std::sync::{Arc, OnceLock};

use tokio_util::sync::CancellationToken;

use crate::error::Cause;

struct Inner {
    token: CancellationToken,
    cause: OnceLock<Cause>,
    parent: Option<Context>,
}

/// Cancellable execution context handed to the main routine.
///
/// Cheap to clone; clones share the token and the cause slot.
///
/// # Example
/// ```
/// use appvisor::{Cause, Context, StopReason};
///
/// let ctx = Context::background();
/// assert!(ctx.cause().is_none());
///
/// ctx.cancel_with(StopReason::from("done"));
/// ctx.cancel_with(StopReason::from("ignored"));
/// assert!(ctx.is_cancelled());
/// assert_eq!(ctx.cause(), Some(Cause::Stopped(StopReason::from("done"))));
/// ```
#[derive(Clone)]
pub struct Context {
    inner: Arc<Inner>,
}

impl Context {
    /// Creates a root context with no parent.
    pub fn background() -> Self {
        Self::from_token(CancellationToken::new())
    }

    /// Wraps an existing token. Cancelling the token from outside yields
    /// [`Cause::Canceled`].
    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            inner: Arc::new(Inner {
                token,
                cause: OnceLock::new(),
                parent: None,
            }),
        }
    }

    /// Derives a child context, cancelled whenever `self` is.
    ///
    /// Cancelling the child does not affect `self`.
    pub fn child(&self) -> Self {
        Self {
            inner: Arc::new(Inner {
                token: self.inner.token.child_token(),
                cause: OnceLock::new(),
                parent: Some(self.clone()),
            }),
        }
    }

    /// Returns `true` once the context has been cancelled by any path.
    pub fn is_cancelled(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// Completes when the context is cancelled.
    pub async fn cancelled(&self) {
        self.inner.token.cancelled().await
    }

    /// Returns the underlying token, for APIs that take a [`CancellationToken`].
    pub fn token(&self) -> &CancellationToken {
        &self.inner.token
    }

    /// Returns why the context was cancelled, or `None` if it is still live.
    ///
    /// The first cause returned is pinned into the slot, so every later read
    /// returns the same value.
    pub fn cause(&self) -> Option<Cause> {
        if let Some(cause) = self.inner.cause.get() {
            return Some(cause.clone());
        }
        if !self.is_cancelled() {
            return None;
        }
        Some(
            self.inner
                .cause
                .get_or_init(|| self.inherited_cause())
                .clone(),
        )
    }

    /// Cancels the context with `cause` unless it is already cancelled.
    ///
    /// Returns `true` if this call recorded its cause. When the parent got there
    /// first, the parent's cause is recorded instead and `false` is returned.
    pub fn cancel_with(&self, cause: impl Into<Cause>) -> bool {
        if self.is_cancelled() {
            let _ = self.inner.cause.set(self.inherited_cause());
            return false;
        }
        let won = self.inner.cause.set(cause.into()).is_ok();
        self.inner.token.cancel();
        won
    }

    fn inherited_cause(&self) -> Cause {
        self.inner
            .parent
            .as_ref()
            .and_then(Context::cause)
            .unwrap_or(Cause::Canceled)
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("cancelled", &self.is_cancelled())
            .field("cause", &self.inner.cause.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SignalReceived, StopReason};
    use crate::signals::Signal;

    #[test]
    fn test_background_is_live() {
        let ctx = Context::background();
        assert!(!ctx.is_cancelled());
        assert_eq!(ctx.cause(), None);
    }

    #[test]
    fn test_first_cause_wins() {
        let ctx = Context::background();
        assert!(ctx.cancel_with(SignalReceived::new(Signal::INTERRUPT)));
        assert!(!ctx.cancel_with(StopReason::main_returned()));
        assert_eq!(
            ctx.cause(),
            Some(Cause::Signal(SignalReceived::new(Signal::INTERRUPT)))
        );
    }

    #[test]
    fn test_child_inherits_parent_cause() {
        let parent = Context::background();
        let child = parent.child();
        parent.cancel_with(StopReason::from("parent gone"));

        assert!(child.is_cancelled());
        assert_eq!(child.cause(), Some(Cause::Stopped("parent gone".into())));

        // A late explicit cancel on the child keeps the inherited cause.
        assert!(!child.cancel_with(StopReason::main_returned()));
        assert_eq!(child.cause(), Some(Cause::Stopped("parent gone".into())));
    }

    #[test]
    fn test_child_cancel_does_not_touch_parent() {
        let parent = Context::background();
        let child = parent.child();
        child.cancel_with(StopReason::from("child only"));
        assert!(!parent.is_cancelled());
        assert_eq!(parent.cause(), None);
    }

    #[test]
    fn test_foreign_token_cancel_yields_canceled() {
        let token = CancellationToken::new();
        let ctx = Context::from_token(token.clone());
        token.cancel();
        assert_eq!(ctx.cause(), Some(Cause::Canceled));
    }

    #[test]
    fn test_observed_cause_never_changes_under_parent_race() {
        use std::sync::{Barrier, Mutex};

        for _ in 0..2000 {
            let parent = Context::background();
            let child = parent.child();
            let barrier = Arc::new(Barrier::new(3));
            let seen = Arc::new(Mutex::new(Vec::new()));

            let cancel_parent = {
                let (parent, barrier) = (parent.clone(), Arc::clone(&barrier));
                std::thread::spawn(move || {
                    barrier.wait();
                    parent.cancel_with(StopReason::from("parent"));
                })
            };
            let cancel_child = {
                let (child, barrier) = (child.clone(), Arc::clone(&barrier));
                std::thread::spawn(move || {
                    barrier.wait();
                    child.cancel_with(StopReason::from("child"));
                })
            };
            let reader = {
                let (child, barrier, seen) =
                    (child.clone(), Arc::clone(&barrier), Arc::clone(&seen));
                std::thread::spawn(move || {
                    barrier.wait();
                    for _ in 0..50 {
                        if let Some(cause) = child.cause() {
                            seen.lock().unwrap().push(cause);
                        }
                    }
                })
            };
            for h in [cancel_parent, cancel_child, reader] {
                h.join().unwrap();
            }

            let last = child.cause().unwrap();
            assert!(
                seen.lock().unwrap().iter().all(|c| *c == last),
                "cause changed after it was observed"
            );
        }
    }

    #[test]
    fn test_racing_cancels_record_exactly_one_cause() {
        for _ in 0..64 {
            let ctx = Context::background();
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let ctx = ctx.clone();
                    std::thread::spawn(move || ctx.cancel_with(StopReason::new(format!("w{i}"))))
                })
                .collect();
            let winners = handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|won| *won)
                .count();
            assert_eq!(winners, 1);

            let recorded = ctx.cause().unwrap();
            for _ in 0..3 {
                assert_eq!(ctx.cause().unwrap(), recorded);
            }
        }
    }
}
