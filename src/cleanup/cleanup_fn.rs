//! # Function-backed cleanup (`CleanupFn`)
//!
//! [`CleanupFn`] wraps a closure `F: Fn() -> Fut`. Each [`Cleanup::stop`] call
//! creates a fresh future; if the closure needs state, capture an `Arc<...>`.
//!
//! ## Example
//! ```rust
//! use appvisor::{CleanupFn, CleanupRef};
//!
//! let c: CleanupRef = CleanupFn::arc("profiler", || async {
//!     // write the profile out
//! });
//! assert_eq!(c.name(), "profiler");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use super::step::Cleanup;

/// Closure-backed cleanup step.
#[derive(Debug)]
pub struct CleanupFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> CleanupFn<F> {
    /// Creates a new function-backed cleanup.
    ///
    /// Prefer [`CleanupFn::arc`] when you immediately need a
    /// [`CleanupRef`](super::CleanupRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the cleanup and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Cleanup for CleanupFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn stop(&self) {
        (self.f)().await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
