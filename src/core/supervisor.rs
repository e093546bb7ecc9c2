//! # Supervisor: runs the main routine under a signal-aware root context.
//!
//! The [`Supervisor`] owns the [`Config`], the [`Log`] sink and the
//! [`CleanupSet`]. It creates the root context, drives the main routine to
//! completion, and converts what it returned into a process exit code.
//!
//! ## Run sequence
//! ```text
//! run(main)
//!   ├─► notify(background, cfg.signals)  ─► (ctx, stop)
//!   ├─► StopOnDrop guard                    (stop(cfg.stop_reason) on every exit path)
//!   ├─► main(ctx).catch_unwind().await      (no timeout)
//!   ├─► cause = ctx.cause()                 (captured before the guard stops ctx)
//!   ├─► drop guard                          (subscriptions revoked)
//!   ├─► cleanup.run_all()                   (always, panics isolated)
//!   ├─► panicked? ─► resume_unwind
//!   └─► Outcome{error, cause}.verdict()
//!          ├─ Success / CleanShutdown ─► 0
//!          ├─ SignalFailure(sig)      ─► log Critical, 128 + sig
//!          └─ Failure                 ─► log Critical, 1
//! ```
//!
//! ## Example
//! ```rust,no_run
//! use appvisor::{Context, Supervisor};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     Supervisor::default()
//!         .execute(|ctx: Context| async move {
//!             ctx.cancelled().await;
//!             Err(ctx.cause().expect("cancelled").into())
//!         })
//!         .await;
//! }
//! ```

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use super::builder::SupervisorBuilder;
use super::config::Config;
use super::outcome::Outcome;
use crate::cleanup::CleanupSet;
use crate::context::{Context, Stop, notify};
use crate::error::StopReason;
use crate::logging::{Log, Severity, TracingLog};

/// Runs a main routine and maps its outcome to an exit code.
pub struct Supervisor {
    cfg: Config,
    log: Arc<dyn Log>,
    cleanup: CleanupSet,
}

impl Default for Supervisor {
    /// Default config, [`TracingLog`], no cleanup steps.
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Supervisor {
    /// Creates a supervisor with the given config, [`TracingLog`] and no cleanup steps.
    pub fn new(cfg: Config) -> Self {
        Self::new_internal(cfg, Arc::new(TracingLog::new()), CleanupSet::default())
    }

    pub(super) fn new_internal(cfg: Config, log: Arc<dyn Log>, cleanup: CleanupSet) -> Self {
        Self { cfg, log, cleanup }
    }

    /// Returns a builder for a supervisor with custom collaborators.
    pub fn builder(cfg: Config) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg)
    }

    /// Returns the supervisor's configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Runs `main` once under a fresh root context and returns the exit code.
    ///
    /// Must be called from within a tokio runtime. Cleanup runs on every path,
    /// including a panicking `main`, whose panic is resumed afterwards.
    ///
    /// Signal subscriptions are revoked before cleanup starts, and the tokio
    /// handler stays installed for the life of the process. A second Ctrl-C
    /// during cleanup is therefore swallowed rather than killing the process,
    /// so cleanup steps must finish in bounded time.
    pub async fn run<F, Fut>(&self, main: F) -> i32
    where
        F: FnOnce(Context) -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        let (ctx, stop) = notify(&Context::background(), &self.cfg.signals);
        let guard = StopOnDrop {
            stop,
            reason: self.cfg.stop_reason.clone(),
        };

        let main_ctx = ctx.clone();
        let returned = AssertUnwindSafe(async move { main(main_ctx).await })
            .catch_unwind()
            .await;
        let cause = ctx.cause();
        drop(guard);

        self.cleanup.run_all(&self.log).await;

        match returned {
            Ok(result) => self.conclude(Outcome::new(result, cause)),
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }

    /// Runs `main` and terminates the process when the exit code is nonzero.
    ///
    /// Returns normally only on success or clean shutdown.
    pub async fn execute<F, Fut>(&self, main: F)
    where
        F: FnOnce(Context) -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        let code = self.run(main).await;
        if code != 0 {
            std::process::exit(code);
        }
    }

    /// Runs cleanup and classifies `result` without any root context.
    ///
    /// For callers that handle signals themselves. No cause is known, so a
    /// returned error is never treated as a clean shutdown.
    pub async fn finish(&self, result: anyhow::Result<()>) -> i32 {
        self.cleanup.run_all(&self.log).await;
        self.conclude(Outcome::new(result, None))
    }

    /// Classifies the outcome and logs it once if it is a failure.
    fn conclude(&self, outcome: Outcome) -> i32 {
        let verdict = outcome.verdict(self.cfg.clean_shutdown_on_cause);
        if verdict.is_failure() {
            if let Some(message) = outcome.failure_message() {
                self.log.log(Severity::Critical, &message);
            }
        }
        tracing::debug!(
            verdict = verdict.as_label(),
            cause = outcome.cause.as_ref().map(|c| c.as_label()),
            "main returned"
        );
        verdict.exit_code()
    }
}

/// Stops the root context when dropped, so every exit path revokes the
/// signal subscriptions.
struct StopOnDrop {
    stop: Stop,
    reason: StopReason,
}

impl Drop for StopOnDrop {
    fn drop(&mut self) {
        self.stop.stop(self.reason.clone());
    }
}

/// Runs `main` with the default [`Supervisor`] and returns the exit code.
///
/// # Example
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let code = appvisor::run(|_ctx| async { Ok(()) }).await;
/// assert_eq!(code, 0);
/// # }
/// ```
pub async fn run<F, Fut>(main: F) -> i32
where
    F: FnOnce(Context) -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    Supervisor::default().run(main).await
}

/// Runs `main` with the default [`Supervisor`] and exits the process on a
/// nonzero code.
pub async fn execute<F, Fut>(main: F)
where
    F: FnOnce(Context) -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    Supervisor::default().execute(main).await
}
