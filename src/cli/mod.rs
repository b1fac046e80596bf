//! Command-line front end.
//!
//! Validates the roster files, turns the flags into `MCP_CREW_*` variables and
//! runs the MCP server executable as a child process until it exits.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode, ExitStatus};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use thiserror::Error;

use crate::process::Process;
use crate::project::variables::{VariableSet, TOPIC_KEY};
use crate::server::settings::{
    AGENTS_FILE_ENV, DEFAULT_TOPIC, PROCESS_ENV, TASKS_FILE_ENV, TOPIC_ENV, VARIABLES_ENV,
    VERBOSE_ENV, VERSION_ENV,
};
use crate::utilities::errors::ConfigError;
use crate::utilities::logger::init_logging;
use crate::VERSION;

/// Overrides the server executable launched by the CLI.
pub const SERVER_BIN_ENV: &str = "MCP_CREW_SERVER_BIN";
/// File name of the server executable installed next to the CLI.
pub const SERVER_BIN_NAME: &str = "mcp-crew-ai-server";

/// MCP Crew AI - Run CrewAI agents through MCP
#[derive(Debug, Clone, Parser)]
#[command(name = "mcp-crew-ai", disable_version_flag = true)]
pub struct Args {
    /// Path to agents YAML file
    #[arg(long)]
    pub agents: Option<PathBuf>,

    /// Path to tasks YAML file
    #[arg(long)]
    pub tasks: Option<PathBuf>,

    /// The main topic for the crew to work on
    #[arg(long, default_value = DEFAULT_TOPIC)]
    pub topic: String,

    /// Process type: sequential or hierarchical
    #[arg(long, value_enum, default_value_t = Process::Sequential)]
    pub process: Process,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// JSON string or path to JSON file with variables to replace in YAML files
    #[arg(long)]
    pub variables: Option<String>,

    /// Show version and exit
    #[arg(long)]
    pub version: bool,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Both --agents and --tasks arguments are required. Use --help for more information.")]
    MissingArguments,

    #[error("Agents file not found: {}", .0.display())]
    AgentsFileNotFound(PathBuf),

    #[error("Tasks file not found: {}", .0.display())]
    TasksFileNotFound(PathBuf),

    #[error("Could not load variables file {}: {source}", path.display())]
    VariablesFile {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },

    #[error("Could not resolve path {}: {source}", path.display())]
    Path {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not locate the MCP server executable: {0}")]
    ServerExecutable(#[source] std::io::Error),

    #[error("Could not install interrupt handler: {0}")]
    Signal(#[from] ctrlc::Error),

    #[error("Error running MCP server {}: {source}", program.display())]
    Launch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("MCP server exited with {0}")]
    ServerExited(ExitStatus),
}

/// Entry point of the `mcp-crew-ai` binary.
pub fn main() -> ExitCode {
    let args = Args::parse();

    if args.version {
        println!("MCP Crew AI v{}", VERSION);
        return ExitCode::SUCCESS;
    }

    init_logging();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Validate the arguments and run the server until it stops.
pub fn run(args: &Args) -> Result<(), CliError> {
    let env = child_environment(args, VERSION)?;
    let program = server_executable(std::env::var_os(SERVER_BIN_ENV).map(PathBuf::from))?;

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = interrupted.clone();
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))?;

    run_server_process(&program, &env, &interrupted)
}

/// Environment for the server process, computed from the arguments.
///
/// Fails when either roster is missing or the variables file cannot be read.
/// `topic` in the variables always takes the value of `--topic`.
pub fn child_environment(
    args: &Args,
    version: &str,
) -> Result<BTreeMap<&'static str, String>, CliError> {
    let (Some(agents), Some(tasks)) = (&args.agents, &args.tasks) else {
        return Err(CliError::MissingArguments);
    };
    if !agents.exists() {
        return Err(CliError::AgentsFileNotFound(agents.clone()));
    }
    if !tasks.exists() {
        return Err(CliError::TasksFileNotFound(tasks.clone()));
    }

    let mut variables = match &args.variables {
        Some(value) => load_variables(value)?,
        None => VariableSet::new(),
    };
    variables.insert(TOPIC_KEY, args.topic.as_str());

    let agents = absolute(agents)?;
    let tasks = absolute(tasks)?;

    log::info!("Starting MCP Crew AI server with:");
    log::info!("- Agents file: {}", agents.display());
    log::info!("- Tasks file: {}", tasks.display());
    log::info!("- Topic: {}", args.topic);
    log::info!("- Process type: {}", args.process);

    let mut env = BTreeMap::new();
    env.insert(AGENTS_FILE_ENV, agents.to_string_lossy().into_owned());
    env.insert(TASKS_FILE_ENV, tasks.to_string_lossy().into_owned());
    env.insert(TOPIC_ENV, args.topic.clone());
    env.insert(PROCESS_ENV, args.process.to_string());
    env.insert(VERBOSE_ENV, if args.verbose { "1" } else { "0" }.to_string());
    env.insert(VERSION_ENV, version.to_string());
    env.insert(VARIABLES_ENV, variables.to_json());
    Ok(env)
}

/// Read `--variables` as a JSON file when one exists at that path, else as inline JSON.
///
/// A broken file is fatal; broken inline JSON only warns.
fn load_variables(value: &str) -> Result<VariableSet, CliError> {
    let path = Path::new(value);
    if path.is_file() {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::VariablesFile {
            path: path.to_path_buf(),
            source: ConfigError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;
        return VariableSet::from_json_str(&text).map_err(|source| CliError::VariablesFile {
            path: path.to_path_buf(),
            source,
        });
    }

    match VariableSet::from_json_str(value) {
        Ok(variables) => Ok(variables),
        Err(e) => {
            log::warn!("Could not parse variables as JSON: {} ({})", value, e);
            Ok(VariableSet::new())
        }
    }
}

fn absolute(path: &Path) -> Result<PathBuf, CliError> {
    std::path::absolute(path).map_err(|source| CliError::Path {
        path: path.to_path_buf(),
        source,
    })
}

/// The override if given, else the server binary next to the running executable.
pub fn server_executable(override_path: Option<PathBuf>) -> Result<PathBuf, CliError> {
    if let Some(path) = override_path.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(path);
    }
    let current = std::env::current_exe().map_err(CliError::ServerExecutable)?;
    Ok(current.with_file_name(format!(
        "{}{}",
        SERVER_BIN_NAME,
        std::env::consts::EXE_SUFFIX
    )))
}

/// Spawn the server with `env` and wait for it.
///
/// An exit while `interrupted` is set is a normal shutdown.
pub fn run_server_process(
    program: &Path,
    env: &BTreeMap<&'static str, String>,
    interrupted: &AtomicBool,
) -> Result<(), CliError> {
    log::info!("Executing: {}", program.display());

    let launch_error = |source| CliError::Launch {
        program: program.to_path_buf(),
        source,
    };
    let mut child = Command::new(program)
        .envs(env.iter().map(|(key, value)| (*key, value.as_str())))
        .spawn()
        .map_err(launch_error)?;
    let status = child.wait().map_err(launch_error)?;

    if interrupted.load(Ordering::SeqCst) {
        log::info!("Server stopped by user");
        return Ok(());
    }
    if !status.success() {
        return Err(CliError::ServerExited(status));
    }
    Ok(())
}
