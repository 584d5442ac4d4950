//! Errors surfaced by document providers and the resolution engine

use thiserror::Error;

use crate::source::SourceError;

/// Errors that can occur while retrieving or resolving a configuration document
///
/// This is the error type of the whole [`DocumentProvider`](super::DocumentProvider)
/// surface, so a resolving provider can hand back an underlying provider's
/// error without re-wrapping it.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Two registered factories share a type name
    #[error("duplicate config source factory \"{0}\"")]
    DuplicateFactoryType(String),

    /// A factory reported an empty type name
    #[error("config source factory type must not be empty")]
    EmptyFactoryType,

    /// A reference names a type with no registered factory
    #[error("config source \"{0}\" not found")]
    UnknownSourceType(String),

    /// The factory failed to create the source instance
    #[error("failed to create config source {source_type}: {source}")]
    SourceCreationFailed {
        source_type: String,
        #[source]
        source: SourceError,
    },

    /// The source failed to produce a value for a selector
    #[error("config source \"{source_type}\" failed to retrieve value: {source}")]
    SourceRetrievalFailed {
        source_type: String,
        selector: String,
        #[source]
        source: SourceError,
    },

    /// A reference expression could not be parsed or substituted
    #[error("invalid config source reference {expression:?}: {reason}")]
    InvalidReference { expression: String, reason: String },

    /// The retrieved document does not have a usable shape
    #[error("invalid configuration document: {0}")]
    InvalidDocument(String),

    /// No document exists at the location
    #[error("no configuration document at {0:?}")]
    DocumentNotFound(String),

    /// The caller cancelled the operation
    #[error("operation cancelled")]
    Cancelled,

    /// The provider was shut down and cannot serve retrievals
    #[error("config source provider has been shut down")]
    ShutDown,

    /// One or more resources failed to release during shutdown
    #[error("{0}")]
    ShutdownFailed(ShutdownErrors),

    /// IO error reading a document
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The document could not be parsed
    #[error("failed to parse configuration document: {0}")]
    Parse(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ConfigError {
    /// Create a source creation error
    pub fn creation_failed(source_type: impl Into<String>, source: SourceError) -> Self {
        Self::SourceCreationFailed {
            source_type: source_type.into(),
            source,
        }
    }

    /// Create a source retrieval error
    pub fn retrieval_failed(
        source_type: impl Into<String>,
        selector: impl Into<String>,
        source: SourceError,
    ) -> Self {
        Self::SourceRetrievalFailed {
            source_type: source_type.into(),
            selector: selector.into(),
            source,
        }
    }

    /// Create an invalid reference error
    pub fn invalid_reference(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidReference {
            expression: expression.into(),
            reason: reason.into(),
        }
    }

    /// Create a free-form error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Whether this error came from cancellation, directly or through a source
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Cancelled => true,
            Self::SourceCreationFailed { source, .. } | Self::SourceRetrievalFailed { source, .. } => {
                matches!(source, SourceError::Cancelled)
            }
            _ => false,
        }
    }
}

/// Failures collected while releasing resources during shutdown
///
/// Each entry names the owner (a source type, or the wrapped provider's
/// scheme) and the failure text.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ShutdownErrors {
    failures: Vec<(String, String)>,
}

impl ShutdownErrors {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure
    pub fn push(&mut self, owner: impl Into<String>, error: impl std::fmt::Display) {
        self.failures.push((owner.into(), error.to_string()));
    }

    /// Recorded failures as `(owner, message)` pairs
    pub fn failures(&self) -> &[(String, String)] {
        &self.failures
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Merge another collection into this one
    pub fn extend(&mut self, other: ShutdownErrors) {
        self.failures.extend(other.failures);
    }

    /// `Ok` when nothing failed, otherwise a [`ConfigError::ShutdownFailed`]
    pub fn into_result(self) -> ConfigResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::ShutdownFailed(self))
        }
    }
}

impl std::fmt::Display for ShutdownErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to shut down config sources: ")?;
        for (i, (owner, message)) in self.failures.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", owner, message)?;
        }
        Ok(())
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_factory_message() {
        let err = ConfigError::DuplicateFactoryType("tstcfgsrc".to_string());
        assert_eq!(err.to_string(), "duplicate config source factory \"tstcfgsrc\"");
    }

    #[test]
    fn test_creation_failed_message() {
        let err = ConfigError::creation_failed("tstcfgsrc", SourceError::other("boom"));
        assert_eq!(err.to_string(), "failed to create config source tstcfgsrc: boom");
    }

    #[test]
    fn test_retrieval_failed_message() {
        let err = ConfigError::retrieval_failed("tstcfgsrc", "selector", SourceError::not_found("selector"));
        assert_eq!(
            err.to_string(),
            "config source \"tstcfgsrc\" failed to retrieve value: no value for selector \"selector\""
        );
    }

    #[test]
    fn test_is_cancelled() {
        assert!(ConfigError::Cancelled.is_cancelled());
        assert!(ConfigError::retrieval_failed("env", "HOME", SourceError::Cancelled).is_cancelled());
        assert!(!ConfigError::ShutDown.is_cancelled());
    }

    #[test]
    fn test_shutdown_errors_aggregate() {
        let mut errors = ShutdownErrors::new();
        assert!(errors.clone().into_result().is_ok());

        errors.push("env", "close failed");
        errors.push("vault", SourceError::other("token revoked"));
        assert_eq!(errors.len(), 2);

        let err = errors.into_result().unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to shut down config sources: env: close failed; vault: token revoked"
        );
    }
}
