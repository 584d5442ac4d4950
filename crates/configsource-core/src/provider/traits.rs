//! Document provider trait

use async_trait::async_trait;

use super::error::ConfigResult;
use crate::types::{CancellationToken, Retrieved, WatcherFn};

/// Fetches raw configuration documents from locations it understands
///
/// Implementations:
/// - `FileProvider`: YAML/JSON files (`file:` scheme)
/// - `MemoryProvider`: documents held in memory, for tests and embedding
/// - `ResolvingProvider`: wraps another provider and resolves config source references
#[async_trait]
pub trait DocumentProvider: Send + Sync {
    /// Retrieve the document at `location`
    ///
    /// `watcher`, when given, may be invoked later if the document changes.
    async fn retrieve(
        &self,
        cancel: &CancellationToken,
        location: &str,
        watcher: Option<WatcherFn>,
    ) -> ConfigResult<Retrieved>;

    /// Release provider-wide resources
    async fn shutdown(&self, _cancel: &CancellationToken) -> ConfigResult<()> {
        Ok(())
    }

    /// The location scheme this provider serves (e.g. `file`)
    fn scheme(&self) -> &str;
}
