//! Shared types: documents, retrieval handles, cancellation

mod cancellation;
mod document;

pub use cancellation::CancellationToken;
pub use document::{value_kind, ChangeEvent, CloseFn, ConfigMap, Retrieved, WatcherFn};
