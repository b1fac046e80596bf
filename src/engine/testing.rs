//! In-memory engine that records what it is asked to build.

use std::sync::Mutex;

use serde_json::Value;

use super::{AgentSpec, CrewSpec, Orchestrator, OutputCapture, TaskSpec};
use crate::utilities::errors::EngineError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedTask {
    pub spec: TaskSpec,
    /// Name of the agent handle the task was bound to.
    pub bound_to: String,
}

#[derive(Debug, Default)]
pub struct RecordingEngine {
    pub agents: Mutex<Vec<AgentSpec>>,
    pub tasks: Mutex<Vec<RecordedTask>>,
    pub crews: Mutex<Vec<CrewSpec>>,
    pub reject_agent: Option<String>,
    pub reject_crew: bool,
    pub kickoff_error: Option<String>,
    pub stdout: String,
    pub stderr: String,
    pub result: Value,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self {
            result: Value::String("crew finished".to_string()),
            ..Default::default()
        }
    }

    pub fn agent_specs(&self) -> Vec<AgentSpec> {
        self.agents.lock().unwrap().clone()
    }

    pub fn task_records(&self) -> Vec<RecordedTask> {
        self.tasks.lock().unwrap().clone()
    }

    pub fn crew_count(&self) -> usize {
        self.crews.lock().unwrap().len()
    }
}

impl Orchestrator for RecordingEngine {
    type Agent = String;
    type Task = RecordedTask;
    type Crew = usize;

    fn create_agent(&self, spec: &AgentSpec) -> Result<String, EngineError> {
        if self.reject_agent.as_deref() == Some(spec.name.as_str()) {
            return Err(EngineError::Construction("role is not allowed".to_string()));
        }
        self.agents.lock().unwrap().push(spec.clone());
        Ok(spec.name.clone())
    }

    fn create_task(&self, spec: &TaskSpec, agent: &String) -> Result<RecordedTask, EngineError> {
        let record = RecordedTask {
            spec: spec.clone(),
            bound_to: agent.clone(),
        };
        self.tasks.lock().unwrap().push(record.clone());
        Ok(record)
    }

    fn create_crew(
        &self,
        spec: &CrewSpec,
        agents: Vec<String>,
        tasks: Vec<RecordedTask>,
    ) -> Result<usize, EngineError> {
        if self.reject_crew {
            return Err(EngineError::Construction("manager LLM is required".to_string()));
        }
        self.crews.lock().unwrap().push(*spec);
        Ok(agents.len() + tasks.len())
    }

    fn kickoff(&self, _crew: usize, capture: &mut OutputCapture) -> Result<Value, EngineError> {
        capture.stdout().write_all(self.stdout.as_bytes()).unwrap();
        capture.stderr().write_all(self.stderr.as_bytes()).unwrap();
        match &self.kickoff_error {
            Some(message) => Err(EngineError::Execution(message.clone())),
            None => Ok(self.result.clone()),
        }
    }
}
