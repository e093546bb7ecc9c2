//! # Example: graceful
//!
//! A ticking worker that shuts down cleanly on Ctrl-C.
//!
//! Demonstrates how to:
//! - Run a main routine under [`Supervisor`] with a signal-aware [`Context`].
//! - Register a cleanup step that runs on every exit path.
//! - Return the context's cause to get exit code `0`, or disable the
//!   clean-shutdown policy to get `128 + N`.
//!
//! ## Flow
//! ```text
//! Supervisor::execute(worker)
//!     ├─► notify(background, [SIGINT, SIGTERM])
//!     ├─► worker(ctx) ticks until ctx is cancelled
//!     │     └─► Ctrl-C ─► Cause::Signal(SIGINT)
//!     ├─► cleanup "flush-metrics"
//!     └─► exit code
//!          ├─ default:               0   (worker returned the cause)
//!          └─ APPVISOR_DEMO_STRICT:  130 (cause classified like any error, logged)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example graceful
//! APPVISOR_DEMO_STRICT=1 cargo run --example graceful; echo $?
//! ```

use std::time::Duration;

use anyhow::Context as _;
use appvisor::{CleanupFn, Config, Context, Signal, Supervisor};
use tracing_subscriber::EnvFilter;

async fn worker(ctx: Context) -> anyhow::Result<()> {
    let mut tick = 0u64;
    loop {
        tokio::select! {
            _ = ctx.cancelled() => {
                let cause = ctx.cause().context("cancelled context without a cause")?;
                tracing::info!(%cause, "worker stopping");
                return Err(cause).context(format!("worker interrupted after {tick} ticks"));
            }
            _ = tokio::time::sleep(Duration::from_millis(500)) => {
                tick += 1;
                tracing::info!(tick, "working");
            }
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut cfg = Config::default();
    cfg.signals.push(Signal::TERMINATE);
    cfg.clean_shutdown_on_cause = std::env::var_os("APPVISOR_DEMO_STRICT").is_none();

    let sup = Supervisor::builder(cfg)
        .with_cleanup(CleanupFn::arc("flush-metrics", || async {
            tracing::info!("metrics flushed");
        }))
        .build();

    sup.execute(worker).await;
}
