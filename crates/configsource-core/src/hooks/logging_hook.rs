//! Hook that reports lifecycle events through a [`Logger`]

use super::traits::Hook;
use crate::logging::SharedLogger;

/// Logs engine construction, resolved references and shutdown
pub struct LoggingHook {
    logger: SharedLogger,
}

impl LoggingHook {
    pub fn new(logger: SharedLogger) -> Self {
        Self { logger }
    }
}

impl Hook for LoggingHook {
    fn on_new(&self) {
        self.logger.info("config source provider created");
    }

    fn on_retrieve(&self, source_type: &str) {
        self.logger.debug(&format!("resolved reference from config source {}", source_type));
    }

    fn on_shutdown(&self) {
        self.logger.info("config source provider shut down");
    }
}

impl std::fmt::Debug for LoggingHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggingHook").finish_non_exhaustive()
    }
}
