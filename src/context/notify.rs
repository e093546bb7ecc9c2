//! # Signal-aware root context.
//!
//! [`notify`] derives a context from a parent that is cancelled when one of the
//! given OS signals arrives, and returns a [`Stop`] handle for cancelling it
//! explicitly.
//!
//! ## Listener
//! ```text
//! notify(parent, signals)
//!   ├─ parent already cancelled ─► no subscription, no listener
//!   └─ subscribe_all(signals) ─► spawn listener:
//!         select! {
//!           ctx.cancelled()      ─► exit (stop or parent won)
//!           next_signal(&subs)   ─► cancel_with(SignalReceived{sig}), exit
//!         }
//!         subscriptions dropped on exit
//! ```
//!
//! ## Rules
//! - Exactly one listener per context; none when the parent is already done.
//! - Exactly one cause is ever recorded; whoever sets the slot first wins.
//! - [`Stop::stop`] is idempotent and revokes the subscriptions by aborting the
//!   listener, which owns them.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinHandle;

use super::Context;
use crate::error::{SignalReceived, StopReason};
use crate::signals::{self, Signal};

/// Derives a context from `parent` that is cancelled on any of `signals`.
///
/// Must be called from within a tokio runtime. Never fails: a signal that
/// cannot be registered is logged and skipped.
///
/// # Example
/// ```
/// use appvisor::{Cause, Context, Signal, StopReason, notify};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (ctx, stop) = notify(&Context::background(), &[Signal::INTERRUPT]);
/// assert!(!ctx.is_cancelled());
///
/// stop.stop(StopReason::main_returned());
/// assert_eq!(ctx.cause(), Some(Cause::Stopped(StopReason::main_returned())));
/// # }
/// ```
pub fn notify(parent: &Context, signals: &[Signal]) -> (Context, Stop) {
    let ctx = parent.child();
    if ctx.is_cancelled() {
        return (ctx.clone(), Stop::new(ctx, None));
    }

    let mut subs = signals::subscribe_all(signals);
    let listener_ctx = ctx.clone();
    let listener = tokio::spawn(async move {
        tokio::select! {
            biased;
            _ = listener_ctx.cancelled() => {}
            signal = signals::next_signal(&mut subs) => {
                if listener_ctx.cancel_with(SignalReceived::new(signal)) {
                    tracing::debug!(%signal, "context cancelled by signal");
                }
            }
        }
    });

    (ctx.clone(), Stop::new(ctx, Some(listener)))
}

struct StopInner {
    ctx: Context,
    listener: Mutex<Option<JoinHandle<()>>>,
}

/// Cancels a [`notify`] context explicitly and revokes its signal subscriptions.
///
/// Cheap to clone. Safe to call any number of times from any thread.
#[derive(Clone)]
pub struct Stop {
    inner: Arc<StopInner>,
}

impl Stop {
    fn new(ctx: Context, listener: Option<JoinHandle<()>>) -> Self {
        Self {
            inner: Arc::new(StopInner {
                ctx,
                listener: Mutex::new(listener),
            }),
        }
    }

    /// Cancels the context with `reason` unless it is already cancelled, then
    /// revokes the signal subscriptions.
    ///
    /// Only the first cancellation (by stop, signal or parent) is recorded.
    pub fn stop(&self, reason: impl Into<StopReason>) {
        self.inner.ctx.cancel_with(reason.into());

        let listener = self
            .inner
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = listener {
            handle.abort();
        }
    }

    /// Reports whether the signal listener task is still alive.
    pub fn is_listening(&self) -> bool {
        self.inner
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Returns the context this handle stops.
    pub fn context(&self) -> &Context {
        &self.inner.ctx
    }
}

impl std::fmt::Debug for Stop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stop")
            .field("ctx", &self.inner.ctx)
            .field("listening", &self.is_listening())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::Cause;

    async fn wait_until(mut cond: impl FnMut() -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !cond() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    #[cfg(unix)]
    fn raise(signal: i32) {
        // SAFETY: sending a signal to our own process; tokio's handler is installed.
        let rc = unsafe { libc::kill(libc::getpid(), signal) };
        assert_eq!(rc, 0);
    }

    #[tokio::test]
    async fn test_stop_records_reason_and_is_idempotent() {
        let (ctx, stop) = notify(&Context::background(), &[Signal::INTERRUPT]);
        assert!(stop.is_listening());

        stop.stop("first");
        stop.stop("second");
        stop.clone().stop(StopReason::main_returned());

        assert!(ctx.is_cancelled());
        assert_eq!(ctx.cause(), Some(Cause::Stopped("first".into())));
        assert!(!stop.is_listening());
    }

    #[tokio::test]
    async fn test_pre_cancelled_parent_spawns_no_listener() {
        let parent = Context::background();
        parent.cancel_with(StopReason::from("already gone"));

        let (ctx, stop) = notify(&parent, &[Signal::INTERRUPT]);
        assert!(ctx.is_cancelled());
        assert!(!stop.is_listening());
        assert_eq!(ctx.cause(), Some(Cause::Stopped("already gone".into())));

        stop.stop(StopReason::main_returned());
        assert_eq!(ctx.cause(), Some(Cause::Stopped("already gone".into())));
    }

    #[tokio::test]
    async fn test_parent_cancel_retires_listener() {
        let parent = Context::background();
        let (ctx, stop) = notify(&parent, &[Signal::INTERRUPT]);

        parent.cancel_with(StopReason::from("upstream"));
        wait_until(|| !stop.is_listening()).await;
        assert_eq!(ctx.cause(), Some(Cause::Stopped("upstream".into())));
    }

    #[tokio::test]
    async fn test_concurrent_stops_record_one_reason() {
        let (ctx, stop) = notify(&Context::background(), &[Signal::INTERRUPT]);
        let mut set = tokio::task::JoinSet::new();
        for i in 0..16 {
            let stop = stop.clone();
            set.spawn(async move { stop.stop(StopReason::new(format!("stop-{i}"))) });
        }
        while set.join_next().await.is_some() {}

        let cause = ctx.cause().unwrap();
        assert!(matches!(&cause, Cause::Stopped(r) if r.as_str().starts_with("stop-")));
        stop.stop("late");
        assert_eq!(ctx.cause(), Some(cause));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_signal_cancels_with_signal_cause() {
        let usr1 = Signal::from_raw(libc::SIGUSR1);
        let (ctx, stop) = notify(&Context::background(), &[usr1]);

        raise(libc::SIGUSR1);
        tokio::time::timeout(Duration::from_secs(5), ctx.cancelled())
            .await
            .expect("signal did not cancel the context");

        assert_eq!(ctx.cause(), Some(Cause::Signal(SignalReceived::new(usr1))));
        wait_until(|| !stop.is_listening()).await;

        stop.stop(StopReason::main_returned());
        assert_eq!(ctx.cause(), Some(Cause::Signal(SignalReceived::new(usr1))));
    }

    #[cfg(unix)]
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_signal_racing_stop_records_one_stable_cause() {
        let alrm = Signal::from_raw(libc::SIGALRM);
        for round in 0..200 {
            let (ctx, stop) = notify(&Context::background(), &[alrm]);
            let reason = format!("round-{round}");

            let stopper = {
                let (stop, reason) = (stop.clone(), reason.clone());
                tokio::spawn(async move {
                    tokio::task::yield_now().await;
                    stop.stop(reason);
                })
            };
            raise(libc::SIGALRM);
            stopper.await.unwrap();

            let first = stop.context().cause().expect("stopped context has a cause");
            match &first {
                Cause::Signal(received) => assert_eq!(received.signal, alrm),
                Cause::Stopped(r) => assert_eq!(r.as_str(), reason),
                other => panic!("unexpected cause {other:?}"),
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
            for _ in 0..3 {
                assert_eq!(ctx.cause().as_ref(), Some(&first));
            }
            assert!(!stop.is_listening());
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_no_delivery_after_stop() {
        let usr2 = Signal::from_raw(libc::SIGUSR2);
        let (ctx, stop) = notify(&Context::background(), &[usr2]);

        stop.stop("done");
        assert!(!stop.is_listening());

        raise(libc::SIGUSR2);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(ctx.cause(), Some(Cause::Stopped("done".into())));
    }
}
