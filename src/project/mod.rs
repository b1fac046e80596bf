//! Crew project definition: YAML rosters and the template variables applied to them.

pub mod config;
pub mod variables;

pub use config::{load_yaml_with_variables, AgentConfig, TaskConfig, UnresolvedField};
pub use variables::{VariableSet, TOPIC_KEY};
