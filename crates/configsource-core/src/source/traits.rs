//! Core traits and types for config sources

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::logging::SharedLogger;
use crate::types::ConfigMap;

/// Errors reported by config sources and their factories
#[derive(Error, Debug)]
pub enum SourceError {
    /// The selector does not name a value in this source
    #[error("no value for selector \"{selector}\"")]
    NotFound { selector: String },

    /// Creation or retrieval parameters are malformed
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// The backing system cannot be reached
    #[error("source not available: {0}")]
    Unavailable(String),

    /// The operation was cancelled by the caller
    #[error("operation cancelled")]
    Cancelled,

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl SourceError {
    /// Create a not-found error for a selector
    pub fn not_found(selector: impl Into<String>) -> Self {
        Self::NotFound {
            selector: selector.into(),
        }
    }

    /// Create an invalid parameters error
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams(message.into())
    }

    /// Create a free-form error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

pub type SourceResult<T> = Result<T, SourceError>;

/// A long-lived backend that turns selectors into literal values
///
/// Instances are created by a [`Factory`], owned by the source manager and
/// shared across resolution cycles, so implementations must be safe to call
/// concurrently.
#[async_trait]
pub trait Source: Send + Sync {
    /// Retrieve the value for `selector`
    ///
    /// `params` are the reference's retrieval parameters, if it had any.
    async fn retrieve(&self, selector: &str, params: Option<&ConfigMap>) -> SourceResult<Value>;

    /// Release resources held by the source
    ///
    /// Called exactly once, when the owning engine shuts down.
    async fn close(&self) -> SourceResult<()> {
        Ok(())
    }
}

/// Creates [`Source`] instances of one type
///
/// # Example
///
/// ```
/// use configsource_core::source::{Factory, EnvSourceFactory};
///
/// let factory = EnvSourceFactory::new();
/// assert_eq!(factory.source_type(), "env");
/// ```
#[async_trait]
pub trait Factory: Send + Sync {
    /// Unique, non-empty type name used in references (`${<type>:selector}`)
    fn source_type(&self) -> &str;

    /// Create a source from its creation parameters
    async fn create_source(
        &self,
        params: &ConfigMap,
        logger: SharedLogger,
    ) -> SourceResult<Arc<dyn Source>>;
}
