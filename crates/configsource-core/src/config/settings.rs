//! Per-type creation parameters for config sources
//!
//! ```yaml
//! config_sources:
//!   env:
//!     prefix: APP_
//!   memory:
//!     values:
//!       token: abc
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::provider::{ConfigError, ConfigResult};
use crate::types::ConfigMap;

/// Creation parameters keyed by config source type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceSettings {
    #[serde(default, rename = "config_sources")]
    sources: HashMap<String, ConfigMap>,
}

impl SourceSettings {
    /// Create empty settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse settings from YAML text
    ///
    /// Empty text yields empty settings.
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("invalid config source settings: {}", e)))
    }

    /// Load settings from a YAML file
    ///
    /// A missing file yields empty settings.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Set the creation parameters for a type, replacing any previous ones
    pub fn insert(&mut self, source_type: impl Into<String>, params: ConfigMap) {
        self.sources.insert(source_type.into(), params);
    }

    /// Builder form of [`SourceSettings::insert`]
    pub fn with(mut self, source_type: impl Into<String>, params: ConfigMap) -> Self {
        self.insert(source_type, params);
        self
    }

    /// Creation parameters for a type, if configured
    pub fn params_for(&self, source_type: &str) -> Option<&ConfigMap> {
        self.sources.get(source_type)
    }

    /// Configured type names
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
