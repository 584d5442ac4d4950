//! Factory registry: validates and indexes config source factories by type name

use std::sync::Arc;

use indexmap::IndexMap;

use super::traits::Factory;
use crate::provider::{ConfigError, ConfigResult};

/// Registered factories, keyed by their unique type name
///
/// Built once when the engine is constructed and read-only afterwards.
/// Iteration follows registration order.
#[derive(Clone, Default)]
pub struct FactoryRegistry {
    factories: IndexMap<String, Arc<dyn Factory>>,
}

impl FactoryRegistry {
    /// Validate and index `factories`
    ///
    /// Fails on the first empty or repeated type name.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use configsource_core::source::{EnvSourceFactory, Factory, FactoryRegistry};
    ///
    /// let factories: Vec<Arc<dyn Factory>> = vec![
    ///     Arc::new(EnvSourceFactory::new()),
    ///     Arc::new(EnvSourceFactory::new()),
    /// ];
    /// let err = FactoryRegistry::new(factories).err().unwrap();
    /// assert_eq!(err.to_string(), "duplicate config source factory \"env\"");
    /// ```
    pub fn new(factories: impl IntoIterator<Item = Arc<dyn Factory>>) -> ConfigResult<Self> {
        let mut index = IndexMap::new();
        for factory in factories {
            let source_type = factory.source_type().to_string();
            if source_type.is_empty() {
                return Err(ConfigError::EmptyFactoryType);
            }
            if index.contains_key(&source_type) {
                return Err(ConfigError::DuplicateFactoryType(source_type));
            }
            index.insert(source_type, factory);
        }
        Ok(Self { factories: index })
    }

    /// Find the factory for a type name
    pub fn lookup(&self, source_type: &str) -> Option<&Arc<dyn Factory>> {
        self.factories.get(source_type)
    }

    /// Check if a type name is registered
    pub fn contains(&self, source_type: &str) -> bool {
        self.factories.contains_key(source_type)
    }

    /// Registered type names in registration order
    pub fn types(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl std::fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field("types", &self.types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{EnvSourceFactory, MemorySourceFactory};

    fn factories(types: &[&str]) -> Vec<Arc<dyn Factory>> {
        types
            .iter()
            .map(|t| Arc::new(MemorySourceFactory::with_type(*t)) as Arc<dyn Factory>)
            .collect()
    }

    #[test]
    fn test_empty_registry() {
        let registry = FactoryRegistry::new(Vec::new()).unwrap();
        assert!(registry.is_empty());
        assert!(registry.lookup("env").is_none());
    }

    #[test]
    fn test_lookup_registered() {
        let mut list = factories(&["memory"]);
        list.push(Arc::new(EnvSourceFactory::new()));
        let registry = FactoryRegistry::new(list).unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("env"));
        assert_eq!(registry.lookup("env").unwrap().source_type(), "env");
        assert_eq!(registry.lookup("memory").unwrap().source_type(), "memory");
        assert!(registry.lookup("vault").is_none());
    }

    #[test]
    fn test_types_keep_registration_order() {
        let registry = FactoryRegistry::new(factories(&["zeta", "alpha", "mid"])).unwrap();
        assert_eq!(registry.types(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let err = FactoryRegistry::new(factories(&["a", "tstcfgsrc", "tstcfgsrc"])).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateFactoryType(ref t) if t == "tstcfgsrc"));
    }

    #[test]
    fn test_empty_type_rejected() {
        let err = FactoryRegistry::new(factories(&[""])).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyFactoryType));
    }
}
