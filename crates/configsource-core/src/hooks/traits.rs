//! Hook trait definition

/// Observer of engine lifecycle events
///
/// Notifications are delivered synchronously on the engine's task, so
/// implementations should return quickly.
pub trait Hook: Send + Sync {
    /// The engine was constructed
    fn on_new(&self) {}

    /// A reference to a source of type `source_type` was resolved
    ///
    /// Only fired for resolution cycles that succeed as a whole.
    fn on_retrieve(&self, _source_type: &str) {}

    /// The engine was shut down
    fn on_shutdown(&self) {}
}
