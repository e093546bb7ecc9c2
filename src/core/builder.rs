use std::sync::Arc;

use super::{config::Config, supervisor::Supervisor};
use crate::{
    cleanup::{CleanupRef, CleanupSet},
    logging::{Log, TracingLog},
};

/// Builder for constructing a Supervisor with custom collaborators.
pub struct SupervisorBuilder {
    cfg: Config,
    log: Option<Arc<dyn Log>>,
    cleanup: CleanupSet,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            log: None,
            cleanup: CleanupSet::default(),
        }
    }

    /// Sets the sink for the failure line and cleanup warnings.
    ///
    /// Defaults to [`TracingLog`].
    pub fn with_logger(mut self, log: Arc<dyn Log>) -> Self {
        self.log = Some(log);
        self
    }

    /// Registers a cleanup step.
    ///
    /// Steps run after the main routine returns, newest first.
    pub fn with_cleanup(mut self, step: CleanupRef) -> Self {
        self.cleanup.push(step);
        self
    }

    /// Replaces all registered cleanup steps.
    pub fn with_cleanups(mut self, steps: Vec<CleanupRef>) -> Self {
        self.cleanup = CleanupSet::new(steps);
        self
    }

    /// Builds and returns the Supervisor instance.
    pub fn build(self) -> Supervisor {
        let log = self
            .log
            .unwrap_or_else(|| Arc::new(TracingLog::new()) as Arc<dyn Log>);
        Supervisor::new_internal(self.cfg, log, self.cleanup)
    }
}
