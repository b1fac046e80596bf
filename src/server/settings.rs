//! Tool-host configuration, read once from the environment at startup.

use std::path::{Path, PathBuf};

use crate::kickoff::WorkflowRequest;
use crate::process::Process;
use crate::project::variables::{VariableSet, TOPIC_KEY};

use super::tool::KickoffParams;

pub const AGENTS_FILE_ENV: &str = "MCP_CREW_AGENTS_FILE";
pub const TASKS_FILE_ENV: &str = "MCP_CREW_TASKS_FILE";
pub const TOPIC_ENV: &str = "MCP_CREW_TOPIC";
pub const PROCESS_ENV: &str = "MCP_CREW_PROCESS";
pub const VERBOSE_ENV: &str = "MCP_CREW_VERBOSE";
pub const VARIABLES_ENV: &str = "MCP_CREW_VARIABLES";
pub const VERSION_ENV: &str = "MCP_CREW_VERSION";

/// Topic used when none is configured.
pub const DEFAULT_TOPIC: &str = "Artificial Intelligence";

/// Process-wide defaults for every `kickoff` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub agents_file: PathBuf,
    pub tasks_file: PathBuf,
    pub topic: String,
    pub process: Process,
    pub verbose: bool,
    /// `{"topic": topic}` overlaid with the variables JSON.
    pub variables: VariableSet,
    pub version: String,
}

impl ServerSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let config_dir = default_config_dir();

        let agents_file = non_empty(AGENTS_FILE_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| config_dir.join("agents.yml"));
        let tasks_file = non_empty(TASKS_FILE_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| config_dir.join("tasks.yml"));
        let topic = lookup(TOPIC_ENV).unwrap_or_else(|| DEFAULT_TOPIC.to_string());
        let process = Process::from_env_value(&lookup(PROCESS_ENV).unwrap_or_default());
        let verbose = lookup(VERBOSE_ENV).as_deref() == Some("1");
        let version =
            non_empty(VERSION_ENV).unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

        let mut variables = VariableSet::new();
        variables.insert(TOPIC_KEY, topic.as_str());
        if let Some(json) = non_empty(VARIABLES_ENV) {
            match VariableSet::from_json_str(&json) {
                Ok(extra) => {
                    log::info!("Loaded additional variables: {:?}", extra.keys());
                    variables.extend_from(&extra);
                }
                Err(e) => log::warn!("Could not parse variables JSON {}: {}", json, e),
            }
        }

        Self {
            agents_file,
            tasks_file,
            topic,
            process,
            verbose,
            variables,
            version,
        }
    }

    pub fn log_startup(&self) {
        log::info!(
            "Agents YAML path: {} (exists: {})",
            self.agents_file.display(),
            self.agents_file.exists()
        );
        log::info!(
            "Tasks YAML path: {} (exists: {})",
            self.tasks_file.display(),
            self.tasks_file.exists()
        );
        log::info!("Topic: {}", self.topic);
        log::info!("Process type: {}", self.process);
        log::info!("Verbose: {}", self.verbose);
        log::info!("Template variables: {:?}", self.variables);
    }

    /// Fill a tool call's omitted (or empty) arguments from these settings.
    pub fn resolve(&self, params: &KickoffParams) -> WorkflowRequest {
        let given = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());

        let agents_file = given(&params.agents_file)
            .map(PathBuf::from)
            .unwrap_or_else(|| self.agents_file.clone());
        let tasks_file = given(&params.tasks_file)
            .map(PathBuf::from)
            .unwrap_or_else(|| self.tasks_file.clone());
        let topic = given(&params.topic).unwrap_or_else(|| self.topic.clone());

        let explicit = params
            .additional_context
            .as_ref()
            .map(|context| VariableSet::from_json_entries(context))
            .unwrap_or_default();
        let variables = VariableSet::for_call(&topic, &explicit, &self.variables);

        WorkflowRequest {
            agents_file,
            tasks_file,
            topic,
            variables,
        }
    }
}

const DEMOS_DIR: &str = "demos";

/// Directory holding the bundled demo rosters.
///
/// Searched next to the running executable (`demos/`, then
/// `../share/mcp-crew-ai/demos/`), falling back to the source tree.
pub fn default_config_dir() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    config_dir_near(exe_dir.as_deref())
}

fn config_dir_near(exe_dir: Option<&Path>) -> PathBuf {
    exe_dir
        .into_iter()
        .flat_map(|dir| {
            [
                dir.join(DEMOS_DIR),
                dir.join("..")
                    .join("share")
                    .join(env!("CARGO_PKG_NAME"))
                    .join(DEMOS_DIR),
            ]
        })
        .find(|candidate| candidate.join("agents.yml").is_file())
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(DEMOS_DIR))
}
