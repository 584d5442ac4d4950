//! Document providers
//!
//! - `DocumentProvider`: the retrieval contract
//! - `FileProvider` / `MemoryProvider`: raw document sources
//! - `ResolvingProvider`: wraps another provider and resolves config source references

mod traits;
mod error;
mod file;
mod memory;
mod resolving;

pub use traits::DocumentProvider;
pub use error::{ConfigError, ConfigResult, ShutdownErrors};
pub use file::FileProvider;
pub use memory::MemoryProvider;
pub use resolving::{ResolvingProvider, ResolvingProviderBuilder};
