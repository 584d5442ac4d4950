//! Config source resolution engine
//!
//! Turns configuration documents that contain config source references into
//! fully literal documents. A reference names a config source type and a
//! selector instead of holding a value:
//!
//! ```yaml
//! exporters:
//!   otlp:
//!     endpoint: ${env:OTLP_ENDPOINT}
//!     headers:
//!       api-key: ${vault:secret/data/otlp?field=key}
//! ```
//!
//! The engine sits between a raw document loader and the consuming
//! application:
//!
//! - `provider`: the `DocumentProvider` contract, raw file/memory providers,
//!   and `ResolvingProvider`, which wraps any provider and resolves references
//! - `source`: the `Source`/`Factory` plug-in traits, the factory registry and
//!   the per-type instance manager
//! - `resolver`: reference syntax and the document walk
//! - `hooks`: lifecycle observers
//! - `config`: per-type creation parameters
//! - `logging`: runtime-agnostic logging
//!
//! ```rust,ignore
//! use configsource_core::{ResolvingProvider, FileProvider, EnvSourceFactory, CancellationToken};
//!
//! let provider = ResolvingProvider::builder(Arc::new(FileProvider::new()))
//!     .factory(Arc::new(EnvSourceFactory::new()))
//!     .logger(Arc::new(TracingLogger::new()))
//!     .build()?;
//!
//! let retrieved = provider.retrieve(&CancellationToken::new(), "file:config.yaml", None).await?;
//! let config = retrieved.as_map()?;
//! ```

pub mod types;
pub mod logging;
pub mod config;
pub mod hooks;
pub mod source;
pub mod resolver;
pub mod provider;

// Re-export commonly used types
pub use types::{CancellationToken, ChangeEvent, ConfigMap, Retrieved, WatcherFn};

pub use logging::{Logger, NoOpLogger, SharedLogger, TracingLogger};

pub use config::SourceSettings;

pub use hooks::{Hook, HookRegistry, LoggingHook};

pub use source::{
    Factory, FactoryRegistry, Source, SourceError, SourceManager, SourceResult,
    EnvSource, EnvSourceFactory, MemorySource, MemorySourceFactory,
};

pub use resolver::{Reference, Resolved, Resolver};

pub use provider::{
    ConfigError, ConfigResult, DocumentProvider, FileProvider, MemoryProvider,
    ResolvingProvider, ResolvingProviderBuilder, ShutdownErrors,
};
