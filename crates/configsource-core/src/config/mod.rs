//! Engine settings
//!
//! Creation parameters for config sources, loaded from YAML or built in code.

mod settings;

pub use settings::SourceSettings;
