//! Logging abstractions for the resolution engine
//!
//! The engine only talks to the [`Logger`] trait. Hosts pick a backend:
//! [`NoOpLogger`] (the default) or [`TracingLogger`], which forwards to `tracing`.

mod traits;
mod noop;
mod tracing_logger;

pub use traits::{Logger, SharedLogger};
pub use noop::NoOpLogger;
pub use tracing_logger::TracingLogger;
