//! Runs one workflow end to end and folds every failure into a [`RunResult`].

use std::path::PathBuf;

use uuid::Uuid;

use crate::crew::CrewAssembler;
use crate::crews::RunResult;
use crate::engine::{format_output, CrewSpec, Orchestrator, OutputCapture};
use crate::process::Process;
use crate::project::variables::VariableSet;
use crate::utilities::errors::CrewError;

/// Longest prefix of agent output written to the log after a run.
const OUTPUT_SAMPLE_CHARS: usize = 500;

/// A fully resolved kickoff: concrete paths and the merged variable set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowRequest {
    pub agents_file: PathBuf,
    pub tasks_file: PathBuf,
    pub topic: String,
    pub variables: VariableSet,
}

/// Something that can execute a workflow request.
pub trait WorkflowRunner: Send + Sync {
    /// Run to completion. Never panics on bad input; errors come back as
    /// [`RunResult::Failure`].
    fn run(&self, request: &WorkflowRequest) -> RunResult;
}

/// Runs workflows on an [`Orchestrator`] with a fixed process and verbosity.
pub struct CrewRunner<E> {
    engine: E,
    process: Process,
    verbose: bool,
}

impl<E: Orchestrator> CrewRunner<E> {
    pub fn new(engine: E, process: Process, verbose: bool) -> Self {
        Self {
            engine,
            process,
            verbose,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    fn execute(&self, request: &WorkflowRequest) -> Result<RunResult, CrewError> {
        let crew = CrewAssembler::new(&self.engine, &request.variables, self.verbose)
            .assemble(&request.agents_file, &request.tasks_file)?;

        log::info!("Creating crew");
        let (agents, tasks) = crew.into_parts();
        let spec = CrewSpec {
            process: self.process,
            verbose: self.verbose,
        };
        let crew = self
            .engine
            .create_crew(&spec, agents, tasks)
            .map_err(CrewError::Crew)?;
        log::info!("Crew created successfully");

        log::info!("Starting crew kickoff with captured output");
        let mut capture = OutputCapture::new();
        let result = self.engine.kickoff(crew, &mut capture);
        let output = capture.finish();
        let result = result.map_err(CrewError::Kickoff)?;
        log::info!("Crew kickoff completed successfully");

        let agent_outputs = format_output(&output.stdout);
        let errors = format_output(&output.stderr);

        if !agent_outputs.is_empty() {
            log::info!("Sample of agent outputs: {}", sample(&agent_outputs));
        }

        Ok(RunResult::success(result, agent_outputs, errors))
    }
}

impl<E: Orchestrator> WorkflowRunner for CrewRunner<E> {
    fn run(&self, request: &WorkflowRequest) -> RunResult {
        let run_id = Uuid::new_v4();
        log::info!(
            "[{}] Kickoff: agents={} tasks={} topic={} process={}",
            run_id,
            request.agents_file.display(),
            request.tasks_file.display(),
            request.topic,
            self.process
        );
        log::info!("[{}] Template variables: {:?}", run_id, request.variables);

        match self.execute(request) {
            Ok(result) => result,
            Err(e) => {
                log::error!("[{}] {}", run_id, e);
                RunResult::failure(e.to_string())
            }
        }
    }
}

fn sample(text: &str) -> String {
    match text.char_indices().nth(OUTPUT_SAMPLE_CHARS) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}
