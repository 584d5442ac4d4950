//! In-memory document provider

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::error::{ConfigError, ConfigResult};
use super::traits::DocumentProvider;
use crate::types::{CancellationToken, ConfigMap, Retrieved, WatcherFn};

/// Document provider serving documents from memory, keyed by location
///
/// Useful for tests and for hosts that assemble configuration in code.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    documents: RwLock<HashMap<String, ConfigMap>>,
}

impl MemoryProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider with one document
    pub fn with_document(location: impl Into<String>, document: ConfigMap) -> Self {
        let provider = Self::new();
        provider.insert(location, document);
        provider
    }

    /// Set the document at a location, replacing any previous one
    pub fn insert(&self, location: impl Into<String>, document: ConfigMap) {
        self.documents.write().insert(location.into(), document);
    }

    /// Remove the document at a location
    pub fn remove(&self, location: &str) -> Option<ConfigMap> {
        self.documents.write().remove(location)
    }

    /// Remove all documents
    pub fn clear(&self) {
        self.documents.write().clear();
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}

#[async_trait]
impl DocumentProvider for MemoryProvider {
    async fn retrieve(
        &self,
        cancel: &CancellationToken,
        location: &str,
        _watcher: Option<WatcherFn>,
    ) -> ConfigResult<Retrieved> {
        if cancel.is_cancelled() {
            return Err(ConfigError::Cancelled);
        }
        let location = location.strip_prefix("memory:").unwrap_or(location);
        self.documents
            .read()
            .get(location)
            .cloned()
            .map(Retrieved::from_map)
            .ok_or_else(|| ConfigError::DocumentNotFound(location.to_string()))
    }

    fn scheme(&self) -> &str {
        "memory"
    }
}
