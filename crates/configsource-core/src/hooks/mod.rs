//! Lifecycle hooks
//!
//! Hooks observe an engine: its construction, each successfully resolved
//! reference, and shutdown. They cannot influence control flow.

mod traits;
mod registry;
mod logging_hook;

pub use traits::Hook;
pub use registry::HookRegistry;
pub use logging_hook::LoggingHook;
