//! Seam to the external orchestration engine.
//!
//! The workflow itself (agent reasoning, delegation, model calls) runs inside
//! an engine behind the [`Orchestrator`] trait. This crate only builds the
//! definitions the engine needs and collects what it prints.

pub mod capture;
pub mod command;
#[cfg(test)]
pub(crate) mod testing;

use serde::{Deserialize, Serialize};

use crate::process::Process;
use crate::utilities::errors::EngineError;

pub use capture::{format_output, CapturedOutput, OutputCapture};
pub use command::CommandEngine;

/// Everything the engine needs to construct one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub name: String,
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub verbose: bool,
    /// Whether the agent may hand work to other agents.
    pub allow_delegation: bool,
}

/// Everything the engine needs to construct one task, minus its agent handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub name: String,
    pub description: String,
    pub expected_output: String,
    /// Name of the agent the task is bound to.
    pub agent: String,
    pub output_file: Option<String>,
}

/// Crew-level options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewSpec {
    pub process: Process,
    pub verbose: bool,
}

/// An agent-orchestration engine.
///
/// Handles are opaque to this crate. `kickoff` blocks until the workflow ends and
/// writes any console text into the supplied capture instead of the real streams.
pub trait Orchestrator: Send + Sync {
    type Agent: Clone;
    type Task;
    type Crew;

    fn create_agent(&self, spec: &AgentSpec) -> Result<Self::Agent, EngineError>;

    fn create_task(&self, spec: &TaskSpec, agent: &Self::Agent) -> Result<Self::Task, EngineError>;

    fn create_crew(
        &self,
        spec: &CrewSpec,
        agents: Vec<Self::Agent>,
        tasks: Vec<Self::Task>,
    ) -> Result<Self::Crew, EngineError>;

    fn kickoff(
        &self,
        crew: Self::Crew,
        capture: &mut OutputCapture,
    ) -> Result<serde_json::Value, EngineError>;
}
