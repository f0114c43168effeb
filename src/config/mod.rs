//! Step configuration.
//!
//! A plain YAML file passed at construction time. Unknown fields are ignored
//! for forward compatibility, optional fields have defaults, and the final
//! layered value (file, then environment and CLI overrides) is validated
//! before any call is made.

mod model;
mod operations;


pub use model::StepConfig;
pub use operations::ConfigOverrides;
