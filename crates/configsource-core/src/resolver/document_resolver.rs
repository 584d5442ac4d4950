//! Walks a document and replaces references with values from config sources

use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;

use super::reference::{parse_string, ParsedString, Reference, Segment};
use crate::logging::SharedLogger;
use crate::provider::{ConfigError, ConfigResult};
use crate::source::{SourceError, SourceManager};
use crate::types::{value_kind, CancellationToken, ConfigMap};

/// Output of one resolution cycle
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    /// The fully literal document
    pub map: ConfigMap,
    /// Source type of every resolved reference, in document order
    pub retrieved: Vec<String>,
}

/// Resolves the references of a document against a [`SourceManager`]
///
/// The input document is never modified; a new tree is built. The walk is
/// depth-first in document order and stops at the first error, so callers
/// never see a partially resolved document.
pub struct Resolver<'a> {
    manager: &'a SourceManager,
    logger: &'a SharedLogger,
}

impl<'a> Resolver<'a> {
    pub fn new(manager: &'a SourceManager, logger: &'a SharedLogger) -> Self {
        Self { manager, logger }
    }

    /// Run one resolution cycle over `document`
    pub async fn resolve(&self, document: &ConfigMap, cancel: &CancellationToken) -> ConfigResult<Resolved> {
        let mut retrieved = Vec::new();
        let map = self.resolve_map(document, cancel, &mut retrieved).await?;
        Ok(Resolved { map, retrieved })
    }

    fn resolve_map<'b>(
        &'b self,
        map: &'b ConfigMap,
        cancel: &'b CancellationToken,
        retrieved: &'b mut Vec<String>,
    ) -> BoxFuture<'b, ConfigResult<ConfigMap>> {
        async move {
            let mut out = ConfigMap::new();
            for (key, value) in map {
                let resolved = self.resolve_value(value, cancel, retrieved).await?;
                out.insert(key.clone(), resolved);
            }
            Ok(out)
        }
        .boxed()
    }

    fn resolve_value<'b>(
        &'b self,
        value: &'b Value,
        cancel: &'b CancellationToken,
        retrieved: &'b mut Vec<String>,
    ) -> BoxFuture<'b, ConfigResult<Value>> {
        async move {
            match value {
                Value::Object(map) => Ok(Value::Object(self.resolve_map(map, cancel, retrieved).await?)),
                Value::Array(items) => {
                    let mut out = Vec::with_capacity(items.len());
                    for item in items {
                        out.push(self.resolve_value(item, cancel, retrieved).await?);
                    }
                    Ok(Value::Array(out))
                }
                Value::String(text) => self.resolve_string(text, cancel, retrieved).await,
                other => Ok(other.clone()),
            }
        }
        .boxed()
    }

    async fn resolve_string(
        &self,
        text: &str,
        cancel: &CancellationToken,
        retrieved: &mut Vec<String>,
    ) -> ConfigResult<Value> {
        match parse_string(text)? {
            ParsedString::Literal(literal) => Ok(Value::String(literal)),
            // Retrieved values are inserted verbatim, never parsed or resolved again
            ParsedString::Whole(reference) => self.fetch(&reference, cancel, retrieved).await,
            ParsedString::Template(segments) => {
                let mut out = String::new();
                for segment in segments {
                    match segment {
                        Segment::Literal(literal) => out.push_str(&literal),
                        Segment::Reference(reference) => {
                            let value = self.fetch(&reference, cancel, retrieved).await?;
                            render_scalar(text, &value, &mut out)?;
                        }
                    }
                }
                Ok(Value::String(out))
            }
        }
    }

    async fn fetch(
        &self,
        reference: &Reference,
        cancel: &CancellationToken,
        retrieved: &mut Vec<String>,
    ) -> ConfigResult<Value> {
        let source_type = reference.source_type.as_str();
        let source = cancel
            .run_until_cancelled(self.manager.get_or_create_configured(source_type))
            .await
            .ok_or(ConfigError::Cancelled)??;

        crate::log_debug!(self.logger, "retrieving {:?} from config source {}", reference.selector, source_type);
        let value = match cancel
            .run_until_cancelled(source.retrieve(&reference.selector, reference.params.as_ref()))
            .await
        {
            Some(Ok(value)) => value,
            Some(Err(e)) => return Err(ConfigError::retrieval_failed(source_type, &reference.selector, e)),
            None => {
                return Err(ConfigError::retrieval_failed(
                    source_type,
                    &reference.selector,
                    SourceError::Cancelled,
                ))
            }
        };

        retrieved.push(source_type.to_string());
        Ok(value)
    }
}

/// Append a scalar value to an interpolated string
fn render_scalar(expression: &str, value: &Value, out: &mut String) -> ConfigResult<()> {
    match value {
        Value::Null => {}
        Value::String(s) => out.push_str(s),
        Value::Bool(b) => out.push_str(&b.to_string()),
        Value::Number(n) => out.push_str(&n.to_string()),
        other => {
            return Err(ConfigError::invalid_reference(
                expression,
                format!("embedded reference must resolve to a scalar, got {}", value_kind(other)),
            ))
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceSettings;
    use crate::logging::NoOpLogger;
    use crate::source::{Factory, FactoryRegistry, MemorySourceFactory};
    use serde_json::json;
    use std::sync::Arc;

    fn map(value: Value) -> ConfigMap {
        value.as_object().cloned().unwrap()
    }

    fn manager_with(values: Value, settings: SourceSettings) -> (SourceManager, Arc<MemorySourceFactory>) {
        let factory = Arc::new(MemorySourceFactory::with_type("tstcfgsrc").with_values(map(values)));
        let registry = FactoryRegistry::new(vec![factory.clone() as Arc<dyn Factory>]).unwrap();
        (SourceManager::new(registry, settings, Arc::new(NoOpLogger)), factory)
    }

    fn manager(values: Value) -> (SourceManager, Arc<MemorySourceFactory>) {
        manager_with(values, SourceSettings::default())
    }

    async fn resolve(manager: &SourceManager, document: Value) -> ConfigResult<Resolved> {
        let logger: SharedLogger = Arc::new(NoOpLogger);
        Resolver::new(manager, &logger)
            .resolve(&map(document), &CancellationToken::new())
            .await
    }

    #[tokio::test]
    async fn test_no_references_unchanged() {
        let (manager, factory) = manager(json!({}));
        let document = json!({
            "receivers": {"otlp": {"protocols": {"grpc": {"endpoint": "0.0.0.0:4317"}}}},
            "list": [1, "two", {"three": 3.0}, null, true],
        });

        let resolved = resolve(&manager, document.clone()).await.unwrap();
        assert_eq!(Value::Object(resolved.map), document);
        assert!(resolved.retrieved.is_empty());
        // No reference, no source
        assert_eq!(factory.created_count(), 0);
    }

    #[tokio::test]
    async fn test_arrays_and_maps() {
        let (manager, _) = manager(json!({
            "k0": "v0",
            "k1": ["a", "b"],
            "k2": {"nested": true},
        }));
        let document = json!({
            "top": {
                "array": ["$tstcfgsrc:k0", "${tstcfgsrc:k1}", "literal"],
                "map": "${tstcfgsrc:k2}",
            },
        });

        let resolved = resolve(&manager, document).await.unwrap();
        assert_eq!(
            Value::Object(resolved.map),
            json!({
                "top": {
                    "array": ["v0", ["a", "b"], "literal"],
                    "map": {"nested": true},
                },
            })
        );
        assert_eq!(resolved.retrieved, vec!["tstcfgsrc", "tstcfgsrc", "tstcfgsrc"]);
    }

    #[tokio::test]
    async fn test_whole_reference_keeps_type() {
        let (manager, _) = manager(json!({"port": 4317, "enabled": false}));
        let resolved = resolve(&manager, json!({"p": "${tstcfgsrc:port}", "e": "$tstcfgsrc:enabled"}))
            .await
            .unwrap();
        assert_eq!(Value::Object(resolved.map), json!({"p": 4317, "e": false}));
    }

    #[tokio::test]
    async fn test_interpolation() {
        let (manager, _) = manager(json!({"host": "collector", "port": 4317, "empty": null}));
        let resolved = resolve(
            &manager,
            json!({"endpoint": "http://${tstcfgsrc:host}:${tstcfgsrc:port}${tstcfgsrc:empty}/v1"}),
        )
        .await
        .unwrap();
        assert_eq!(resolved.map["endpoint"], json!("http://collector:4317/v1"));
    }

    #[tokio::test]
    async fn test_injection_not_reresolved() {
        // A value that looks like YAML or a reference is inserted verbatim
        let (manager, _) = manager(json!({
            "yaml": "a: b\nc: ${tstcfgsrc:other}",
            "other": "should not appear",
        }));
        let resolved = resolve(&manager, json!({"k": "${tstcfgsrc:yaml}"})).await.unwrap();
        assert_eq!(resolved.map["k"], json!("a: b\nc: ${tstcfgsrc:other}"));
        assert_eq!(resolved.retrieved.len(), 1);
    }

    #[tokio::test]
    async fn test_input_not_mutated() {
        let (manager, _) = manager(json!({"k": "v"}));
        let document = map(json!({"a": "${tstcfgsrc:k}"}));
        let logger: SharedLogger = Arc::new(NoOpLogger);

        let resolved = Resolver::new(&manager, &logger)
            .resolve(&document, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(document["a"], json!("${tstcfgsrc:k}"));
        assert_eq!(resolved.map["a"], json!("v"));
    }

    #[tokio::test]
    async fn test_retrieval_error() {
        let (manager, _) = manager(json!({}));
        let err = resolve(&manager, json!({"a": "ok", "b": "$tstcfgsrc:selector"}))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "config source \"tstcfgsrc\" failed to retrieve value: no value for selector \"selector\""
        );
        assert!(matches!(err, ConfigError::SourceRetrievalFailed { ref selector, .. } if selector == "selector"));
    }

    #[tokio::test]
    async fn test_creation_error() {
        let settings = SourceSettings::new().with("tstcfgsrc", map(json!({"values": "not a map"})));
        let (manager, _) = manager_with(json!({}), settings);

        let err = resolve(&manager, json!({"a": "${tstcfgsrc:x}"})).await.unwrap_err();
        assert!(err.to_string().starts_with("failed to create config source tstcfgsrc"));
    }

    #[tokio::test]
    async fn test_unknown_type() {
        let (manager, _) = manager(json!({}));
        let err = resolve(&manager, json!({"a": "${vault:secret}"})).await.unwrap_err();
        assert!(matches!(err, ConfigError::UnknownSourceType(ref t) if t == "vault"));
    }

    #[tokio::test]
    async fn test_embedded_non_scalar() {
        let (manager, _) = manager(json!({"m": {"a": 1}}));
        let err = resolve(&manager, json!({"a": "prefix-${tstcfgsrc:m}"})).await.unwrap_err();
        assert!(err.to_string().contains("must resolve to a scalar, got map"));
    }

    #[tokio::test]
    async fn test_cancelled() {
        let (manager, _) = manager(json!({"k": "v"}));
        let logger: SharedLogger = Arc::new(NoOpLogger);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = Resolver::new(&manager, &logger)
            .resolve(&map(json!({"a": "${tstcfgsrc:k}"})), &cancel)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_order_is_document_order() {
        let first = Arc::new(MemorySourceFactory::with_type("first").with_values(map(json!({"x": 1}))));
        let second = Arc::new(MemorySourceFactory::with_type("second").with_values(map(json!({"x": 2}))));
        let registry = FactoryRegistry::new(vec![first as Arc<dyn Factory>, second as Arc<dyn Factory>]).unwrap();
        let manager = SourceManager::new(registry, SourceSettings::default(), Arc::new(NoOpLogger));

        let resolved = resolve(
            &manager,
            json!({"z": "${second:x}", "a": ["${first:x}", {"b": "${second:x}"}]}),
        )
        .await
        .unwrap();
        assert_eq!(resolved.retrieved, vec!["second", "first", "second"]);
    }
}
