//! Engine backed by an external runner executable.
//!
//! The runner receives the assembled crew as JSON and runs it with the real
//! orchestration library. Hand-off protocol:
//!
//! - `MCP_CREW_PLAN_FILE`: path of a JSON [`CrewPlan`] to execute;
//! - `MCP_CREW_RESULT_FILE`: path where the runner writes the crew result
//!   (JSON, or plain text which is returned as a string);
//! - whatever the runner prints is the agents' console output;
//! - a non-zero exit status means the kickoff failed.

use std::path::Path;
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{AgentSpec, CrewSpec, Orchestrator, OutputCapture, TaskSpec};
use crate::process::Process;
use crate::utilities::errors::EngineError;

/// Environment variable holding the runner command line.
pub const RUNNER_ENV: &str = "MCP_CREW_RUNNER";
/// Runner used when [`RUNNER_ENV`] is unset.
pub const DEFAULT_RUNNER: &str = "crewai-runner";
pub const PLAN_FILE_ENV: &str = "MCP_CREW_PLAN_FILE";
pub const RESULT_FILE_ENV: &str = "MCP_CREW_RESULT_FILE";

/// The crew as handed to the runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewPlan {
    pub process: Process,
    pub verbose: bool,
    pub agents: Vec<AgentSpec>,
    /// Tasks in execution order; each names its agent.
    pub tasks: Vec<TaskSpec>,
}

/// Runs crews through an external runner process.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: String,
    args: Vec<String>,
}

impl CommandEngine {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Parse a whitespace-separated command line such as `python -m crew_runner`.
    pub fn from_command_line(command_line: &str) -> Result<Self, EngineError> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| EngineError::Construction("Empty crew runner command".to_string()))?;
        Ok(Self::new(program, parts.collect()))
    }

    /// Runner from `MCP_CREW_RUNNER`, or [`DEFAULT_RUNNER`].
    pub fn from_env() -> Result<Self, EngineError> {
        let command_line = std::env::var(RUNNER_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_RUNNER.to_string());
        Self::from_command_line(&command_line)
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn require_text(kind: &str, name: &str, field: &str, value: &str) -> Result<(), EngineError> {
    if value.trim().is_empty() {
        return Err(EngineError::Construction(format!(
            "{} '{}' has an empty {}",
            kind, name, field
        )));
    }
    Ok(())
}

fn io_error(context: impl Into<String>) -> impl FnOnce(std::io::Error) -> EngineError {
    let context = context.into();
    move |source| EngineError::Io { context, source }
}

impl Orchestrator for CommandEngine {
    type Agent = AgentSpec;
    type Task = TaskSpec;
    type Crew = CrewPlan;

    fn create_agent(&self, spec: &AgentSpec) -> Result<AgentSpec, EngineError> {
        require_text("Agent", &spec.name, "role", &spec.role)?;
        require_text("Agent", &spec.name, "goal", &spec.goal)?;
        require_text("Agent", &spec.name, "backstory", &spec.backstory)?;
        Ok(spec.clone())
    }

    fn create_task(&self, spec: &TaskSpec, agent: &AgentSpec) -> Result<TaskSpec, EngineError> {
        require_text("Task", &spec.name, "description", &spec.description)?;
        require_text("Task", &spec.name, "expected_output", &spec.expected_output)?;
        Ok(TaskSpec {
            agent: agent.name.clone(),
            ..spec.clone()
        })
    }

    fn create_crew(
        &self,
        spec: &CrewSpec,
        agents: Vec<AgentSpec>,
        tasks: Vec<TaskSpec>,
    ) -> Result<CrewPlan, EngineError> {
        if agents.is_empty() {
            return Err(EngineError::Construction("A crew needs at least one agent".into()));
        }
        if tasks.is_empty() {
            return Err(EngineError::Construction("A crew needs at least one task".into()));
        }
        if let Some(task) = tasks
            .iter()
            .find(|task| !agents.iter().any(|agent| agent.name == task.agent))
        {
            return Err(EngineError::Construction(format!(
                "Task '{}' is assigned to agent '{}' which is not part of the crew",
                task.name, task.agent
            )));
        }

        Ok(CrewPlan {
            process: spec.process,
            verbose: spec.verbose,
            agents,
            tasks,
        })
    }

    fn kickoff(&self, crew: CrewPlan, capture: &mut OutputCapture) -> Result<Value, EngineError> {
        let workdir = tempfile::Builder::new()
            .prefix("mcp-crew-")
            .tempdir()
            .map_err(io_error("Failed to create runner workspace"))?;
        let plan_path = workdir.path().join("plan.json");
        let result_path = workdir.path().join("result.json");

        let plan = serde_json::to_vec_pretty(&crew)
            .map_err(|e| EngineError::Construction(format!("Failed to encode crew plan: {}", e)))?;
        std::fs::write(&plan_path, plan).map_err(io_error("Failed to write crew plan"))?;

        log::debug!("Starting crew runner: {}", self.command_line());
        let output = Command::new(&self.program)
            .args(&self.args)
            .env(PLAN_FILE_ENV, &plan_path)
            .env(RESULT_FILE_ENV, &result_path)
            .stdin(Stdio::null())
            .output()
            .map_err(io_error(format!(
                "Failed to start crew runner '{}'",
                self.program
            )))?;

        capture
            .stdout()
            .write_all(&output.stdout)
            .map_err(io_error("Failed to capture runner stdout"))?;
        capture
            .stderr()
            .write_all(&output.stderr)
            .map_err(io_error("Failed to capture runner stderr"))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr
                .lines()
                .rev()
                .find(|line| !line.trim().is_empty())
                .map(|line| format!(": {}", line.trim()))
                .unwrap_or_default();
            return Err(EngineError::Execution(format!(
                "crew runner exited with {}{}",
                output.status, detail
            )));
        }

        read_result(&result_path)
    }
}

fn read_result(path: &Path) -> Result<Value, EngineError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(serde_json::from_str(&text)
            .unwrap_or_else(|_| Value::String(text.trim_end().to_string()))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::warn!("Crew runner did not write a result file");
            Ok(Value::Null)
        }
        Err(source) => Err(EngineError::Io {
            context: "Failed to read crew result".to_string(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(name: &str) -> AgentSpec {
        AgentSpec {
            name: name.to_string(),
            role: "Researcher".to_string(),
            goal: "Find facts".to_string(),
            backstory: "Curious".to_string(),
            verbose: false,
            allow_delegation: true,
        }
    }

    fn task(name: &str, agent: &str) -> TaskSpec {
        TaskSpec {
            name: name.to_string(),
            description: "Research".to_string(),
            expected_output: "Bullet points".to_string(),
            agent: agent.to_string(),
            output_file: None,
        }
    }

    fn crew_spec() -> CrewSpec {
        CrewSpec {
            process: Process::Hierarchical,
            verbose: true,
        }
    }

    #[test]
    fn test_from_command_line() {
        let engine = CommandEngine::from_command_line("  python -m crew_runner ").unwrap();
        assert_eq!(engine.command_line(), "python -m crew_runner");
        assert!(CommandEngine::from_command_line("   ").is_err());
    }

    #[test]
    fn test_create_agent_rejects_blank_fields() {
        let engine = CommandEngine::new("true", vec![]);
        let mut spec = agent("writer");
        spec.goal = "   ".to_string();
        let err = engine.create_agent(&spec).unwrap_err();
        assert_eq!(err.to_string(), "Agent 'writer' has an empty goal");
    }

    #[test]
    fn test_create_task_binds_agent_name() {
        let engine = CommandEngine::new("true", vec![]);
        let bound = engine
            .create_task(&task("research", "placeholder"), &agent("researcher"))
            .unwrap();
        assert_eq!(bound.agent, "researcher");
    }

    #[test]
    fn test_create_crew_validates_membership() {
        let engine = CommandEngine::new("true", vec![]);
        let err = engine
            .create_crew(&crew_spec(), vec![agent("a")], vec![task("t", "b")])
            .unwrap_err();
        assert!(err.to_string().contains("not part of the crew"));
        assert!(engine
            .create_crew(&crew_spec(), vec![], vec![task("t", "a")])
            .is_err());
        assert!(engine.create_crew(&crew_spec(), vec![agent("a")], vec![]).is_err());
    }

    #[cfg(unix)]
    fn shell(script: &str) -> CommandEngine {
        CommandEngine::new("sh", vec!["-c".to_string(), script.to_string()])
    }

    #[cfg(unix)]
    #[test]
    fn test_kickoff_reads_result_and_captures_output() {
        let engine = shell(
            r#"cat "$MCP_CREW_PLAN_FILE"; echo "warming up" >&2; printf '{"answer": 42}' > "$MCP_CREW_RESULT_FILE""#,
        );
        let crew = engine
            .create_crew(&crew_spec(), vec![agent("a")], vec![task("t", "a")])
            .unwrap();

        let mut capture = OutputCapture::new();
        let result = engine.kickoff(crew, &mut capture).unwrap();
        assert_eq!(result, serde_json::json!({"answer": 42}));

        let output = capture.finish();
        let plan: CrewPlan = serde_json::from_str(&output.stdout).unwrap();
        assert_eq!(plan.process, Process::Hierarchical);
        assert_eq!(plan.tasks[0].agent, "a");
        assert_eq!(output.stderr, "warming up\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_kickoff_plain_text_and_missing_results() {
        let crew = || CrewPlan {
            process: Process::Sequential,
            verbose: false,
            agents: vec![agent("a")],
            tasks: vec![task("t", "a")],
        };

        let text = shell(r#"echo "Final report" > "$MCP_CREW_RESULT_FILE""#);
        let result = text.kickoff(crew(), &mut OutputCapture::new()).unwrap();
        assert_eq!(result, Value::String("Final report".to_string()));

        let silent = shell("true");
        let result = silent.kickoff(crew(), &mut OutputCapture::new()).unwrap();
        assert_eq!(result, Value::Null);
    }

    #[cfg(unix)]
    #[test]
    fn test_kickoff_failure_reports_last_stderr_line() {
        let engine = shell(r#"echo "partial"; echo "rate limited" >&2; exit 3"#);
        let crew = CrewPlan {
            process: Process::Sequential,
            verbose: false,
            agents: vec![agent("a")],
            tasks: vec![task("t", "a")],
        };
        let mut capture = OutputCapture::new();
        let err = engine.kickoff(crew, &mut capture).unwrap_err();
        assert!(matches!(err, EngineError::Execution(_)));
        assert!(err.to_string().ends_with(": rate limited"));
        assert_eq!(capture.finish().stdout, "partial\n");
    }

    #[test]
    fn test_kickoff_missing_program_is_io_error() {
        let engine = CommandEngine::new("definitely-not-a-crew-runner-binary", vec![]);
        let crew = CrewPlan {
            process: Process::Sequential,
            verbose: false,
            agents: vec![agent("a")],
            tasks: vec![task("t", "a")],
        };
        let err = engine.kickoff(crew, &mut OutputCapture::new()).unwrap_err();
        assert!(matches!(err, EngineError::Io { .. }));
    }
}
