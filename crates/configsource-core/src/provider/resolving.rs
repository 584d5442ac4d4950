//! Resolving provider: a document provider that expands config source references
//!
//! Wraps any [`DocumentProvider`]. Each `retrieve` fetches the raw document
//! from the wrapped provider and runs one resolution cycle over it; the
//! result is a fully literal document. Source instances are created on first
//! use and shared by every later cycle until [`ResolvingProvider::shutdown`].

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::error::{ConfigError, ConfigResult, ShutdownErrors};
use super::traits::DocumentProvider;
use crate::config::SourceSettings;
use crate::hooks::{Hook, HookRegistry};
use crate::logging::{NoOpLogger, SharedLogger};
use crate::resolver::Resolver;
use crate::source::{Factory, FactoryRegistry, SourceManager};
use crate::types::{CancellationToken, ConfigMap, Retrieved, WatcherFn};

/// Lifecycle of the engine, guarded by the `RwLock` in [`ResolvingProvider`]
///
/// Retrievals hold the read side for a whole cycle; shutdown takes the write
/// side, so it waits for in-flight cycles and later cycles see `shut_down`.
#[derive(Debug, Default)]
struct Lifecycle {
    shut_down: bool,
}

/// Document provider that resolves config source references
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use configsource_core::provider::{DocumentProvider, MemoryProvider, ResolvingProvider};
/// use configsource_core::source::MemorySourceFactory;
/// use configsource_core::CancellationToken;
/// use serde_json::json;
///
/// # tokio_test_block_on(async {
/// let raw = MemoryProvider::with_document(
///     "main",
///     json!({"token": "${secrets:api}"}).as_object().unwrap().clone(),
/// );
/// let secrets = MemorySourceFactory::with_type("secrets")
///     .with_values(json!({"api": "s3cr3t"}).as_object().unwrap().clone());
///
/// let provider = ResolvingProvider::builder(Arc::new(raw))
///     .factory(Arc::new(secrets))
///     .build()
///     .unwrap();
///
/// let cancel = CancellationToken::new();
/// let retrieved = provider.retrieve(&cancel, "main", None).await.unwrap();
/// assert_eq!(retrieved.as_map().unwrap()["token"], json!("s3cr3t"));
/// provider.shutdown(&cancel).await.unwrap();
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
/// # }
/// ```
pub struct ResolvingProvider {
    underlying: Arc<dyn DocumentProvider>,
    manager: SourceManager,
    hooks: HookRegistry,
    lifecycle: RwLock<Lifecycle>,
    logger: SharedLogger,
}

impl ResolvingProvider {
    /// Create a provider with the given hooks and factories
    ///
    /// Fails if two factories share a type name; hooks are not notified then.
    pub fn new(
        underlying: Arc<dyn DocumentProvider>,
        hooks: Vec<Arc<dyn Hook>>,
        factories: Vec<Arc<dyn Factory>>,
    ) -> ConfigResult<Self> {
        Self::builder(underlying).hooks(hooks).factories(factories).build()
    }

    /// Start building a provider around `underlying`
    pub fn builder(underlying: Arc<dyn DocumentProvider>) -> ResolvingProviderBuilder {
        ResolvingProviderBuilder::new(underlying)
    }

    /// Registered config source type names
    pub fn source_types(&self) -> Vec<&str> {
        self.manager.registry().types()
    }

    /// Type names of the config sources created so far
    pub fn active_sources(&self) -> Vec<String> {
        self.manager.active_types()
    }

    /// Whether [`ResolvingProvider::shutdown`] has been called
    pub async fn is_shut_down(&self) -> bool {
        self.lifecycle.read().await.shut_down
    }

    async fn fetch_document(
        &self,
        cancel: &CancellationToken,
        location: &str,
        watcher: Option<WatcherFn>,
    ) -> ConfigResult<ConfigMap> {
        let mut retrieved = cancel
            .run_until_cancelled(self.underlying.retrieve(cancel, location, watcher))
            .await
            .ok_or(ConfigError::Cancelled)??;

        let document = retrieved.as_map();
        // The raw document is no longer needed once materialized
        if let Err(e) = retrieved.close() {
            crate::log_warn!(self.logger, "failed to close retrieved document {:?}: {}", location, e);
        }
        document
    }
}

#[async_trait]
impl DocumentProvider for ResolvingProvider {
    async fn retrieve(
        &self,
        cancel: &CancellationToken,
        location: &str,
        watcher: Option<WatcherFn>,
    ) -> ConfigResult<Retrieved> {
        let lifecycle = self.lifecycle.read().await;
        if lifecycle.shut_down {
            return Err(ConfigError::ShutDown);
        }

        let document = self.fetch_document(cancel, location, watcher).await?;

        let resolved = Resolver::new(&self.manager, &self.logger)
            .resolve(&document, cancel)
            .await
            .map_err(|e| {
                crate::log_warn!(self.logger, "failed to resolve {:?}: {}", location, e);
                e
            })?;

        crate::log_debug!(
            self.logger,
            "resolved {:?} with {} config source reference(s)",
            location,
            resolved.retrieved.len()
        );
        // Delivered under the read guard so a waiting shutdown is reported after it
        self.hooks.notify_retrieved(resolved.retrieved.iter().map(String::as_str));
        drop(lifecycle);

        Ok(Retrieved::from_map(resolved.map).with_closer(Box::new(|| -> ConfigResult<()> { Ok(()) })))
    }

    async fn shutdown(&self, cancel: &CancellationToken) -> ConfigResult<()> {
        let mut errors = ShutdownErrors::new();
        {
            let mut lifecycle = self.lifecycle.write().await;
            let first = !lifecycle.shut_down;
            lifecycle.shut_down = true;

            if let Err(e) = self.manager.shutdown_all().await {
                match e {
                    ConfigError::ShutdownFailed(failed) => errors.extend(failed),
                    other => errors.push("config sources", other),
                }
            }
            if first {
                if let Err(e) = self.underlying.shutdown(cancel).await {
                    errors.push(self.underlying.scheme(), e);
                }
            }
        }

        self.hooks.notify_shutdown();
        crate::log_info!(self.logger, "config source provider shut down");
        errors.into_result()
    }

    fn scheme(&self) -> &str {
        self.underlying.scheme()
    }
}

impl std::fmt::Debug for ResolvingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvingProvider")
            .field("scheme", &self.underlying.scheme())
            .field("manager", &self.manager)
            .field("hooks", &self.hooks)
            .finish()
    }
}

/// Builder for [`ResolvingProvider`]
pub struct ResolvingProviderBuilder {
    underlying: Arc<dyn DocumentProvider>,
    hooks: Vec<Arc<dyn Hook>>,
    factories: Vec<Arc<dyn Factory>>,
    settings: SourceSettings,
    logger: SharedLogger,
}

impl ResolvingProviderBuilder {
    fn new(underlying: Arc<dyn DocumentProvider>) -> Self {
        Self {
            underlying,
            hooks: Vec::new(),
            factories: Vec::new(),
            settings: SourceSettings::default(),
            logger: Arc::new(NoOpLogger),
        }
    }

    /// Add a hook
    pub fn hook(mut self, hook: Arc<dyn Hook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Add several hooks, keeping their order
    pub fn hooks(mut self, hooks: impl IntoIterator<Item = Arc<dyn Hook>>) -> Self {
        self.hooks.extend(hooks);
        self
    }

    /// Add a config source factory
    pub fn factory(mut self, factory: Arc<dyn Factory>) -> Self {
        self.factories.push(factory);
        self
    }

    /// Add several config source factories
    pub fn factories(mut self, factories: impl IntoIterator<Item = Arc<dyn Factory>>) -> Self {
        self.factories.extend(factories);
        self
    }

    /// Set creation parameters for all config source types
    pub fn settings(mut self, settings: SourceSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Set creation parameters for one config source type
    pub fn source_params(mut self, source_type: impl Into<String>, params: ConfigMap) -> Self {
        self.settings.insert(source_type, params);
        self
    }

    /// Set the logger
    pub fn logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Validate the factories and create the provider
    ///
    /// On success every hook's `on_new` has fired before this returns.
    pub fn build(self) -> ConfigResult<ResolvingProvider> {
        let registry = FactoryRegistry::new(self.factories)?;
        crate::log_info!(
            self.logger,
            "config source provider created over {:?} with sources {:?}",
            self.underlying.scheme(),
            registry.types()
        );

        let provider = ResolvingProvider {
            underlying: self.underlying,
            manager: SourceManager::new(registry, self.settings, Arc::clone(&self.logger)),
            hooks: HookRegistry::new(self.hooks),
            lifecycle: RwLock::new(Lifecycle::default()),
            logger: self.logger,
        };
        provider.hooks.notify_new();
        Ok(provider)
    }
}
