//! Reference resolution
//!
//! Parses config source references out of string values and rebuilds the
//! document with the values the sources return.

mod reference;
mod document_resolver;

pub use reference::{parse_string, ParsedString, Reference, Segment};
pub use document_resolver::{Resolved, Resolver};
