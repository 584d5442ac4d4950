//! In-memory config source

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::traits::{Factory, Source, SourceError, SourceResult};
use crate::logging::SharedLogger;
use crate::types::ConfigMap;

/// Config source serving values from a fixed map
///
/// Selectors are dotted paths into the map (`db.primary.host`); array
/// elements are addressed by index (`hosts.0`).
///
/// # Example
///
/// ```
/// use configsource_core::source::MemorySource;
/// use serde_json::json;
///
/// let source = MemorySource::new(json!({"db": {"port": 5432}}).as_object().unwrap().clone());
/// assert_eq!(source.lookup("db.port"), Some(&json!(5432)));
/// ```
#[derive(Debug)]
pub struct MemorySource {
    values: ConfigMap,
    closes: Arc<AtomicUsize>,
}

impl MemorySource {
    /// Create a source over `values`
    pub fn new(values: ConfigMap) -> Self {
        Self {
            values,
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Look up a dotted path
    pub fn lookup(&self, selector: &str) -> Option<&Value> {
        let mut parts = selector.split('.');
        let first = parts.next()?;
        let mut current = self.values.get(first)?;
        for part in parts {
            current = match current {
                Value::Object(map) => map.get(part)?,
                Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

#[async_trait]
impl Source for MemorySource {
    async fn retrieve(&self, selector: &str, _params: Option<&ConfigMap>) -> SourceResult<Value> {
        self.lookup(selector)
            .cloned()
            .ok_or_else(|| SourceError::not_found(selector))
    }

    async fn close(&self) -> SourceResult<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Factory for [`MemorySource`]
///
/// Values preset on the factory are overlaid by the `values` creation
/// parameter (an object). The factory counts the sources it created and the
/// close calls they received, which makes it useful in tests.
#[derive(Debug)]
pub struct MemorySourceFactory {
    source_type: String,
    preset: ConfigMap,
    created: AtomicUsize,
    closes: Arc<AtomicUsize>,
}

impl Default for MemorySourceFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySourceFactory {
    /// Create a factory of type `memory` with no preset values
    pub fn new() -> Self {
        Self::with_type("memory")
    }

    /// Create a factory registered under a custom type name
    pub fn with_type(source_type: impl Into<String>) -> Self {
        Self {
            source_type: source_type.into(),
            preset: ConfigMap::new(),
            created: AtomicUsize::new(0),
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Preset values served by every created source
    pub fn with_values(mut self, values: ConfigMap) -> Self {
        self.preset = values;
        self
    }

    /// Number of sources created so far
    pub fn created_count(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Number of close calls received by created sources
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Factory for MemorySourceFactory {
    fn source_type(&self) -> &str {
        &self.source_type
    }

    async fn create_source(
        &self,
        params: &ConfigMap,
        _logger: SharedLogger,
    ) -> SourceResult<Arc<dyn Source>> {
        let mut values = self.preset.clone();
        match params.get("values") {
            None | Some(Value::Null) => {}
            Some(Value::Object(overlay)) => {
                values.extend(overlay.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            Some(_) => return Err(SourceError::invalid_params("\"values\" must be a map")),
        }

        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MemorySource {
            values,
            closes: Arc::clone(&self.closes),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use serde_json::json;

    fn map(value: Value) -> ConfigMap {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_memory_source_paths() {
        let source = MemorySource::new(map(json!({
            "token": "abc",
            "db": {"host": "localhost", "ports": [5432, 5433]},
        })));

        assert_eq!(source.retrieve("token", None).await.unwrap(), json!("abc"));
        assert_eq!(source.retrieve("db.host", None).await.unwrap(), json!("localhost"));
        assert_eq!(source.retrieve("db.ports.1", None).await.unwrap(), json!(5433));
        assert_eq!(
            source.retrieve("db", None).await.unwrap(),
            json!({"host": "localhost", "ports": [5432, 5433]})
        );
    }

    #[tokio::test]
    async fn test_memory_source_missing() {
        let source = MemorySource::new(map(json!({"db": {"host": "localhost"}})));
        for selector in ["missing", "db.port", "db.host.deeper", "db.0"] {
            let err = source.retrieve(selector, None).await.unwrap_err();
            assert!(matches!(err, SourceError::NotFound { .. }), "{}", selector);
        }
    }

    #[tokio::test]
    async fn test_factory_overlays_values() {
        let factory = MemorySourceFactory::with_type("secrets")
            .with_values(map(json!({"a": 1, "b": 2})));
        let source = factory
            .create_source(&map(json!({"values": {"b": 3}})), Arc::new(NoOpLogger))
            .await
            .unwrap();

        assert_eq!(factory.source_type(), "secrets");
        assert_eq!(factory.created_count(), 1);
        assert_eq!(source.retrieve("a", None).await.unwrap(), json!(1));
        assert_eq!(source.retrieve("b", None).await.unwrap(), json!(3));
    }

    #[tokio::test]
    async fn test_factory_rejects_bad_values() {
        let factory = MemorySourceFactory::new();
        let result = factory
            .create_source(&map(json!({"values": [1, 2]})), Arc::new(NoOpLogger))
            .await;
        assert!(matches!(result, Err(SourceError::InvalidParams(_))));
        assert_eq!(factory.created_count(), 0);
    }

    #[tokio::test]
    async fn test_close_is_counted_on_factory() {
        let factory = MemorySourceFactory::new();
        let source = factory.create_source(&ConfigMap::new(), Arc::new(NoOpLogger)).await.unwrap();
        source.close().await.unwrap();
        assert_eq!(factory.close_count(), 1);
    }
}
