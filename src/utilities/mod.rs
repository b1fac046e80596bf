//! Shared utilities.

pub mod errors;
pub mod logger;
pub mod string_utils;

pub use errors::{BuildError, ConfigError, CrewError, EngineError};
pub use string_utils::{interpolate_only, TemplateError};
