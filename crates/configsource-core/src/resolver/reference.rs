//! Reference expression syntax
//!
//! A string value may point at a config source instead of holding a literal:
//!
//! - `${type:selector}` anywhere inside a string
//! - `${type:selector?key=value&flag}` with retrieval parameters
//! - `$type:selector` when it makes up the entire string
//! - `$$` for a literal `$`
//!
//! `type` starts with a letter and contains only ASCII alphanumerics and
//! `_ . / -`. Anything else after `$` (for example `${HOME}`) is literal text.

use serde_json::Value;

use crate::provider::{ConfigError, ConfigResult};
use crate::types::ConfigMap;

/// A parsed pointer at a config source value
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    /// Type name of the config source
    pub source_type: String,
    /// Key passed to the source
    pub selector: String,
    /// Retrieval parameters, when the expression had a `?` part
    pub params: Option<ConfigMap>,
}

impl Reference {
    pub fn new(source_type: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            source_type: source_type.into(),
            selector: selector.into(),
            params: None,
        }
    }

    pub fn with_params(mut self, params: ConfigMap) -> Self {
        self.params = Some(params);
        self
    }
}

/// One piece of a string containing embedded references
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Literal(String),
    Reference(Reference),
}

/// How a string value relates to config sources
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedString {
    /// No references; the unescaped text
    Literal(String),
    /// The entire string is a single reference; the value replaces the node as-is
    Whole(Reference),
    /// Literal text interleaved with references; values are rendered into the text
    Template(Vec<Segment>),
}

/// Classify a string value
pub fn parse_string(input: &str) -> ConfigResult<ParsedString> {
    if let Some(reference) = parse_bare(input)? {
        return Ok(ParsedString::Whole(reference));
    }

    let mut segments = parse_segments(input)?;
    let references = segments
        .iter()
        .filter(|s| matches!(s, Segment::Reference(_)))
        .count();

    if references == 0 {
        let text = segments
            .into_iter()
            .filter_map(|s| match s {
                Segment::Literal(text) => Some(text),
                Segment::Reference(_) => None,
            })
            .collect();
        return Ok(ParsedString::Literal(text));
    }
    if segments.len() == 1 {
        if let Some(Segment::Reference(reference)) = segments.pop() {
            return Ok(ParsedString::Whole(reference));
        }
    }
    Ok(ParsedString::Template(segments))
}

/// `$type:selector` spanning the whole string
fn parse_bare(input: &str) -> ConfigResult<Option<Reference>> {
    let Some(body) = input.strip_prefix('$') else {
        return Ok(None);
    };
    if body.starts_with('{') || body.starts_with('$') || body.chars().any(char::is_whitespace) {
        return Ok(None);
    }
    if !is_reference_body(body) {
        return Ok(None);
    }
    parse_body(input, body).map(Some)
}

fn parse_segments(input: &str) -> ConfigResult<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = input;

    while let Some(pos) = rest.find('$') {
        literal.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(tail) = after.strip_prefix('$') {
            literal.push('$');
            rest = tail;
        } else if let Some(inner) = after.strip_prefix('{') {
            let Some(close) = inner.find('}') else {
                return Err(ConfigError::invalid_reference(input, "unterminated \"${\""));
            };
            let body = &inner[..close];
            if is_reference_body(body) {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Reference(parse_body(input, body)?));
            } else {
                literal.push_str("${");
                literal.push_str(body);
                literal.push('}');
            }
            rest = &inner[close + 1..];
        } else {
            literal.push('$');
            rest = after;
        }
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

/// Whether `body` starts with `<type>:`
fn is_reference_body(body: &str) -> bool {
    match body.split_once(':') {
        Some((source_type, _)) => is_valid_type(source_type),
        None => false,
    }
}

fn is_valid_type(source_type: &str) -> bool {
    let mut chars = source_type.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '/' | '-'))
}

fn parse_body(expression: &str, body: &str) -> ConfigResult<Reference> {
    let (source_type, rest) = body
        .split_once(':')
        .ok_or_else(|| ConfigError::invalid_reference(expression, "missing \":\" after source type"))?;

    let (selector, query) = match rest.split_once('?') {
        Some((selector, query)) => (selector, Some(query)),
        None => (rest, None),
    };
    if selector.is_empty() {
        return Err(ConfigError::invalid_reference(expression, "empty selector"));
    }

    let mut reference = Reference::new(source_type, selector);
    if let Some(query) = query {
        reference.params = Some(parse_params(expression, query)?);
    }
    Ok(reference)
}

/// `a=1&b&a=2` → `{"a": ["1", "2"], "b": true}`
fn parse_params(expression: &str, query: &str) -> ConfigResult<ConfigMap> {
    let mut params = ConfigMap::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = match pair.split_once('=') {
            Some((key, value)) => (key, Value::String(value.to_string())),
            None => (pair, Value::Bool(true)),
        };
        if key.is_empty() {
            return Err(ConfigError::invalid_reference(expression, "parameter with empty name"));
        }
        match params.get_mut(key) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                params.insert(key.to_string(), value);
            }
        }
    }
    Ok(params)
}
