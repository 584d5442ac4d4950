//! Environment variable config source

use std::env;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::traits::{Factory, Source, SourceError, SourceResult};
use crate::logging::SharedLogger;
use crate::types::ConfigMap;

/// Config source that reads environment variables
///
/// The selector is the variable name, optionally prefixed by the `prefix`
/// creation parameter. An unset or empty variable falls back to the
/// reference's `default` parameter, if given:
///
/// ```yaml
/// endpoint: ${env:OTLP_ENDPOINT?default=localhost:4317}
/// ```
#[derive(Debug, Default)]
pub struct EnvSource {
    prefix: String,
}

impl EnvSource {
    /// Create a source reading variables verbatim
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source that prepends `prefix` to every selector
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The variable name a selector maps to
    pub fn variable_name(&self, selector: &str) -> String {
        format!("{}{}", self.prefix, selector)
    }
}

#[async_trait]
impl Source for EnvSource {
    async fn retrieve(&self, selector: &str, params: Option<&ConfigMap>) -> SourceResult<Value> {
        let name = self.variable_name(selector);
        if let Ok(value) = env::var(&name) {
            if !value.is_empty() {
                return Ok(Value::String(value));
            }
        }

        match params.and_then(|p| p.get("default")) {
            Some(default) => Ok(default.clone()),
            None => Err(SourceError::not_found(name)),
        }
    }
}

/// Factory for [`EnvSource`], type `env`
///
/// Creation parameters:
/// - `prefix` (string, optional): prepended to every selector
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSourceFactory;

impl EnvSourceFactory {
    /// Create a new env source factory
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Factory for EnvSourceFactory {
    fn source_type(&self) -> &str {
        "env"
    }

    async fn create_source(
        &self,
        params: &ConfigMap,
        _logger: SharedLogger,
    ) -> SourceResult<Arc<dyn Source>> {
        let prefix = match params.get("prefix") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(prefix)) => prefix.clone(),
            Some(_) => return Err(SourceError::invalid_params("\"prefix\" must be a string")),
        };
        Ok(Arc::new(EnvSource::with_prefix(prefix)))
    }
}
