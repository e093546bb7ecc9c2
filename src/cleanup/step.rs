//! # Cleanup step trait.
//!
//! A cleanup step is fire-and-forget from the supervisor's point of view: it
//! returns nothing, and a panic inside it is caught and logged without
//! changing the process exit code.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use appvisor::Cleanup;
//!
//! struct FlushExporter;
//!
//! #[async_trait]
//! impl Cleanup for FlushExporter {
//!     async fn stop(&self) {
//!         // flush buffered spans, ignore export errors
//!     }
//!
//!     fn name(&self) -> &str { "otel-exporter" }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

/// Shared handle to a cleanup step.
pub type CleanupRef = Arc<dyn Cleanup>;

/// Named cleanup step run after the main routine returns.
///
/// ### Implementation requirements
/// - Handle errors internally; there is no way to report them.
/// - Finish promptly; the process exits right after cleanup.
#[async_trait]
pub trait Cleanup: Send + Sync + 'static {
    /// Performs the cleanup.
    async fn stop(&self);

    /// Returns the cleanup name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
