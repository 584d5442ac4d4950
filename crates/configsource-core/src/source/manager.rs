//! Source instance manager: creates, caches and tears down config sources

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use tokio::sync::OnceCell;

use super::registry::FactoryRegistry;
use super::traits::Source;
use crate::config::SourceSettings;
use crate::logging::SharedLogger;
use crate::provider::{ConfigError, ConfigResult, ShutdownErrors};
use crate::types::ConfigMap;

/// Lazily-filled slot for one source type
///
/// The `OnceCell` serializes concurrent first use: one caller runs the
/// factory, the others wait for its outcome.
type SourceSlot = Arc<OnceCell<Arc<dyn Source>>>;

/// Owns every config source instance created by an engine
///
/// At most one instance exists per type name. Instances live until
/// [`SourceManager::shutdown_all`].
pub struct SourceManager {
    registry: FactoryRegistry,
    settings: SourceSettings,
    slots: Mutex<IndexMap<String, SourceSlot>>,
    logger: SharedLogger,
}

impl SourceManager {
    /// Create a manager over a validated registry
    ///
    /// `settings` supplies creation parameters per type for
    /// [`SourceManager::get_or_create_configured`].
    pub fn new(registry: FactoryRegistry, settings: SourceSettings, logger: SharedLogger) -> Self {
        Self {
            registry,
            settings,
            slots: Mutex::new(IndexMap::new()),
            logger,
        }
    }

    /// The registry this manager creates sources from
    pub fn registry(&self) -> &FactoryRegistry {
        &self.registry
    }

    /// Get the source for `source_type`, creating it from `params` on first use
    ///
    /// Creation failures are returned immediately and leave the slot empty.
    /// Parameters passed after the first successful creation are ignored.
    pub async fn get_or_create(
        &self,
        source_type: &str,
        params: &ConfigMap,
    ) -> ConfigResult<Arc<dyn Source>> {
        let factory = self
            .registry
            .lookup(source_type)
            .ok_or_else(|| ConfigError::UnknownSourceType(source_type.to_string()))?;

        let slot = {
            let mut slots = self.slots.lock();
            Arc::clone(slots.entry(source_type.to_string()).or_default())
        };

        let source = slot
            .get_or_try_init(|| async {
                crate::log_debug!(self.logger, "creating config source {}", source_type);
                factory
                    .create_source(params, Arc::clone(&self.logger))
                    .await
                    .map_err(|e| {
                        crate::log_warn!(self.logger, "failed to create config source {}: {}", source_type, e);
                        ConfigError::creation_failed(source_type, e)
                    })
            })
            .await?;

        Ok(Arc::clone(source))
    }

    /// Get the source for `source_type` using its configured creation parameters
    pub async fn get_or_create_configured(&self, source_type: &str) -> ConfigResult<Arc<dyn Source>> {
        let params = self.settings.params_for(source_type).cloned().unwrap_or_default();
        self.get_or_create(source_type, &params).await
    }

    /// Type names of the sources created so far, in creation-request order
    pub fn active_types(&self) -> Vec<String> {
        self.slots
            .lock()
            .iter()
            .filter(|(_, slot)| slot.initialized())
            .map(|(source_type, _)| source_type.clone())
            .collect()
    }

    /// Close every created source
    ///
    /// All sources are closed even when some fail; failures are reported
    /// together. The cache is emptied first, so a second call closes nothing.
    pub async fn shutdown_all(&self) -> ConfigResult<()> {
        let drained: Vec<(String, SourceSlot)> = self.slots.lock().drain(..).collect();

        let mut errors = ShutdownErrors::new();
        for (source_type, slot) in drained {
            let Some(source) = slot.get() else {
                continue;
            };
            match source.close().await {
                Ok(()) => crate::log_debug!(self.logger, "closed config source {}", source_type),
                Err(e) => {
                    crate::log_warn!(self.logger, "failed to close config source {}: {}", source_type, e);
                    errors.push(source_type, e);
                }
            }
        }
        errors.into_result()
    }
}

impl std::fmt::Debug for SourceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceManager")
            .field("registry", &self.registry)
            .field("active", &self.active_types())
            .finish()
    }
}
