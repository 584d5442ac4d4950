//! File-based document provider (YAML, and JSON as a subset of YAML)

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use super::error::{ConfigError, ConfigResult};
use super::traits::DocumentProvider;
use crate::types::{CancellationToken, Retrieved, WatcherFn};

/// Reads configuration documents from the local filesystem
///
/// Locations are paths, optionally prefixed with `file:`. Relative paths are
/// resolved against the provider's base directory when one is set.
///
/// # Example
///
/// ```no_run
/// use configsource_core::provider::FileProvider;
///
/// let provider = FileProvider::new();
/// // provider.retrieve(&cancel, "file:/etc/collector/config.yaml", None)
/// ```
#[derive(Debug, Clone, Default)]
pub struct FileProvider {
    base_dir: Option<PathBuf>,
}

impl FileProvider {
    /// Create a provider resolving relative paths against the working directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider resolving relative paths against `base_dir`
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    /// The filesystem path a location refers to
    pub fn path_for(&self, location: &str) -> PathBuf {
        let raw = Path::new(location.strip_prefix("file:").unwrap_or(location));
        match &self.base_dir {
            Some(base) if raw.is_relative() => base.join(raw),
            _ => raw.to_path_buf(),
        }
    }

    /// Parse document text
    ///
    /// An empty document is `null`, which reads as an empty map.
    pub fn parse(content: &str) -> ConfigResult<Value> {
        if content.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

#[async_trait]
impl DocumentProvider for FileProvider {
    async fn retrieve(
        &self,
        cancel: &CancellationToken,
        location: &str,
        _watcher: Option<WatcherFn>,
    ) -> ConfigResult<Retrieved> {
        let path = self.path_for(location);
        let content = cancel
            .run_until_cancelled(tokio::fs::read_to_string(&path))
            .await
            .ok_or(ConfigError::Cancelled)??;
        Ok(Retrieved::new(Self::parse(&content)?))
    }

    fn scheme(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    #[tokio::test]
    async fn test_reads_yaml() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.yaml"), "a:\n  b: [1, two]\n").unwrap();

        let provider = FileProvider::with_base_dir(dir.path());
        let retrieved = provider
            .retrieve(&CancellationToken::new(), "file:config.yaml", None)
            .await
            .unwrap();

        assert_eq!(Value::Object(retrieved.as_map().unwrap()), json!({"a": {"b": [1, "two"]}}));
    }

    #[tokio::test]
    async fn test_reads_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"x": true}"#).unwrap();

        let provider = FileProvider::new();
        let location = format!("file:{}", path.display());
        let retrieved = provider.retrieve(&CancellationToken::new(), &location, None).await.unwrap();
        assert_eq!(retrieved.raw(), &json!({"x": true}));
    }

    #[tokio::test]
    async fn test_empty_file_is_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("empty.yaml"), "\n").unwrap();

        let provider = FileProvider::with_base_dir(dir.path());
        let retrieved = provider
            .retrieve(&CancellationToken::new(), "empty.yaml", None)
            .await
            .unwrap();
        assert!(retrieved.as_map().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let provider = FileProvider::with_base_dir(dir.path());
        let result = provider.retrieve(&CancellationToken::new(), "absent.yaml", None).await;
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[tokio::test]
    async fn test_invalid_yaml() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.yaml"), "a: [1, 2\n").unwrap();

        let provider = FileProvider::with_base_dir(dir.path());
        let result = provider.retrieve(&CancellationToken::new(), "bad.yaml", None).await;
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_path_for() {
        let provider = FileProvider::with_base_dir("/etc/app");
        assert_eq!(provider.path_for("file:conf.yaml"), PathBuf::from("/etc/app/conf.yaml"));
        assert_eq!(provider.path_for("/abs/conf.yaml"), PathBuf::from("/abs/conf.yaml"));
        assert_eq!(FileProvider::new().scheme(), "file");
    }
}
