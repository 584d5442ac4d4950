//! Configuration documents and retrieval handles

use std::sync::Arc;

use serde_json::Value;

use crate::provider::{ConfigError, ConfigResult};

/// A configuration document: string keys mapped to JSON-shaped values
///
/// Key order is the order in which the keys appeared in the source document.
pub type ConfigMap = serde_json::Map<String, Value>;

/// Notification that a watched location changed
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    /// The document at the location was modified
    Changed { location: String },
    /// Watching failed; the document may be stale
    Error { location: String, message: String },
}

/// Callback handed to a document provider for change notifications
pub type WatcherFn = Arc<dyn Fn(ChangeEvent) + Send + Sync>;

/// Releases resources tied to a retrieved document
pub type CloseFn = Box<dyn FnOnce() -> ConfigResult<()> + Send + Sync>;

/// Result of a document retrieval: raw structured data plus a release handle
pub struct Retrieved {
    raw: Value,
    closer: Option<CloseFn>,
}

impl Retrieved {
    /// Wrap a value with no release handle
    pub fn new(raw: impl Into<Value>) -> Self {
        Self {
            raw: raw.into(),
            closer: None,
        }
    }

    /// Wrap a document map
    pub fn from_map(map: ConfigMap) -> Self {
        Self::new(Value::Object(map))
    }

    /// Attach a release handle, run at most once by [`Retrieved::close`]
    pub fn with_closer(mut self, closer: CloseFn) -> Self {
        self.closer = Some(closer);
        self
    }

    /// The raw retrieved value
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// The retrieved value as a document map
    ///
    /// A `null` value (e.g. an empty YAML file) is an empty document.
    pub fn as_map(&self) -> ConfigResult<ConfigMap> {
        match &self.raw {
            Value::Object(map) => Ok(map.clone()),
            Value::Null => Ok(ConfigMap::new()),
            other => Err(ConfigError::InvalidDocument(format!(
                "expected a map at the document root, found {}",
                value_kind(other)
            ))),
        }
    }

    /// Release resources held by this document
    ///
    /// Only the first call runs the release handle; later calls return `Ok`.
    pub fn close(&mut self) -> ConfigResult<()> {
        match self.closer.take() {
            Some(closer) => closer(),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for Retrieved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retrieved")
            .field("raw", &self.raw)
            .field("has_closer", &self.closer.is_some())
            .finish()
    }
}

/// Human-readable name of a value's JSON type
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "map",
    }
}
