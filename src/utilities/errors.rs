//! Error types shared across loading, assembly and execution.

use std::path::PathBuf;

use thiserror::Error;

use crate::utilities::string_utils::TemplateError;

/// Errors from reading and validating configuration input.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The file exists but could not be read.
    #[error("Could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The text is not valid YAML.
    #[error("Invalid YAML in {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The top level of the document is not a mapping.
    #[error("Expected a mapping of names to definitions in {}", path.display())]
    NotAMapping { path: PathBuf },

    /// One or more entries are missing required fields or have the wrong type.
    #[error("Invalid definitions in {}: {}", path.display(), problems.join("; "))]
    Schema { path: PathBuf, problems: Vec<String> },

    /// Variables text is not valid JSON.
    #[error("Invalid variables JSON: {0}")]
    VariablesJson(#[from] serde_json::Error),

    /// Variables JSON parsed but is not an object.
    #[error("Variables JSON must be an object, found {found}")]
    VariablesNotAnObject { found: &'static str },
}

/// Errors reported by an orchestration engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine rejected an agent, task or crew definition.
    #[error("{0}")]
    Construction(String),

    /// The engine failed while running the workflow.
    #[error("{0}")]
    Execution(String),

    /// The engine could not be reached or its hand-off files could not be handled.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

/// Why a single agent or task could not be built.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A field references variables that are not defined.
    #[error("field `{field}`: {source}")]
    Template {
        field: &'static str,
        #[source]
        source: TemplateError,
    },

    /// The engine refused the definition.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Errors that abort a whole workflow run.
///
/// The display strings are what the caller of the tool sees.
#[derive(Debug, Error)]
pub enum CrewError {
    #[error("Agent file not found: {}", .0.display())]
    AgentFileNotFound(PathBuf),

    #[error("Task file not found: {}", .0.display())]
    TaskFileNotFound(PathBuf),

    #[error("Error loading agents file: {0}")]
    AgentsFile(#[source] ConfigError),

    #[error("Error loading tasks file: {0}")]
    TasksFile(#[source] ConfigError),

    #[error("Error creating agent {name}: {source}")]
    Agent {
        name: String,
        #[source]
        source: BuildError,
    },

    #[error("Error creating task {name}: {source}")]
    Task {
        name: String,
        #[source]
        source: BuildError,
    },

    #[error("Task {task} has invalid agent: {agent} (available agents: {})", available.join(", "))]
    InvalidAgent {
        task: String,
        agent: String,
        available: Vec<String>,
    },

    #[error("No agents were created")]
    NoAgents,

    #[error("No tasks were created")]
    NoTasks,

    #[error("Error creating crew: {0}")]
    Crew(#[source] EngineError),

    #[error("Error in crew kickoff: {0}")]
    Kickoff(#[source] EngineError),
}

impl CrewError {
    /// Map a loader error for the agents file, keeping "not found" distinct.
    pub fn from_agents_config(error: ConfigError) -> Self {
        match error {
            ConfigError::NotFound { path } => CrewError::AgentFileNotFound(path),
            other => CrewError::AgentsFile(other),
        }
    }

    /// Map a loader error for the tasks file, keeping "not found" distinct.
    pub fn from_tasks_config(error: ConfigError) -> Self {
        match error {
            ConfigError::NotFound { path } => CrewError::TaskFileNotFound(path),
            other => CrewError::TasksFile(other),
        }
    }
}
