//! Config source abstractions, registry and instance management
//!
//! - `Source` / `Factory` traits for pluggable backends
//! - `FactoryRegistry`: validated index of factories by type name
//! - `SourceManager`: one lazily created instance per type, torn down at shutdown
//! - Reference backends: `EnvSource`, `MemorySource`

mod traits;
mod registry;
mod manager;
mod env_source;
mod memory_source;

pub use traits::{Factory, Source, SourceError, SourceResult};
pub use registry::FactoryRegistry;
pub use manager::SourceManager;
pub use env_source::{EnvSource, EnvSourceFactory};
pub use memory_source::{MemorySource, MemorySourceFactory};
