//! # appvisor
//!
//! **appvisor** is the bootstrap shell for a command-line process.
//!
//! It creates a root [`Context`] that is cancelled when the process receives a
//! termination signal, runs your async main routine under it, and turns what
//! the routine returned into a process exit code. Cleanup steps (flushing
//! telemetry, stopping profilers) run on every exit path.
//!
//! ## Architecture
//! ```text
//!            ┌──────────────────────────────────────────────┐
//!            │ Supervisor::run(main)                        │
//!            │                                              │
//!  SIGINT ──►│  notify(background, signals) ─► (ctx, stop)  │
//!            │        │ listener task                       │
//!            │        ▼                                     │
//!            │  main(ctx).await ─► Result<()>               │
//!            │        │                                     │
//!            │  cause = ctx.cause();  stop("main returned") │
//!            │  CleanupSet::run_all()                       │
//!            │  Outcome{error, cause}.verdict()             │
//!            └────────┬─────────────────────────────────────┘
//!                     ▼
//!        0 | 1 | 128+N   (execute() exits the process when nonzero)
//! ```
//!
//! ## Exit codes
//! | Outcome                                        | Exit code  | Logged |
//! |------------------------------------------------|------------|--------|
//! | `Ok(())`                                       | `0`        | no     |
//! | error *is* the context's cancellation [`Cause`]| `0`        | no     |
//! | error chain carries [`SignalReceived`]         | `128 + N`  | yes    |
//! | any other error                                | `1`        | yes    |
//!
//! A signal number outside `1..=127` exits with `1` instead of `128 + N`.
//!
//! ## Features
//! | Area           | Description                                              | Key types                              |
//! |----------------|----------------------------------------------------------|----------------------------------------|
//! | **Context**    | Cancellable context with a write-once cause.             | [`Context`], [`Cause`]                 |
//! | **Signals**    | Signal-aware root context with an idempotent stop.       | [`notify`], [`Stop`], [`Signal`]       |
//! | **Supervision**| Run the main routine and derive the exit code.           | [`Supervisor`], [`run`], [`execute`]   |
//! | **Cleanup**    | Steps run after main, panics isolated.                   | [`Cleanup`], [`CleanupFn`]             |
//! | **Logging**    | Where the failure line goes.                             | [`Log`], [`TracingLog`]                |
//! | **Configuration** | Signals, clean-shutdown policy, stop reason.          | [`Config`]                             |
//!
//! ## Example
//! ```rust,no_run
//! use std::time::Duration;
//! use appvisor::{Context, CleanupFn};
//!
//! async fn serve(ctx: Context) -> anyhow::Result<()> {
//!     loop {
//!         tokio::select! {
//!             _ = ctx.cancelled() => {
//!                 // Returning the cause verbatim counts as a clean shutdown.
//!                 return Err(ctx.cause().expect("cancelled").into());
//!             }
//!             _ = tokio::time::sleep(Duration::from_secs(1)) => {
//!                 println!("tick");
//!             }
//!         }
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let sup = appvisor::Supervisor::builder(appvisor::Config::default())
//!         .with_cleanup(CleanupFn::arc("flush", || async {}))
//!         .build();
//!     sup.execute(serve).await;
//! }
//! ```

mod cleanup;
mod context;
mod core;
mod error;
mod logging;
mod signals;

// ---- Public re-exports ----

pub use cleanup::{Cleanup, CleanupFn, CleanupRef, CleanupSet};
pub use context::{Context, Stop, notify};
pub use self::core::{
    Config, EXIT_FAILURE, EXIT_SUCCESS, Outcome, Supervisor, SupervisorBuilder, Verdict, execute,
    run,
};
pub use error::{Cause, SignalReceived, StopReason};
pub use logging::{Log, Severity, TracingLog};
pub use signals::Signal;
