//! Assembles engine agents and tasks from the roster files.

use std::path::Path;

use crate::engine::{AgentSpec, Orchestrator, TaskSpec};
use crate::project::config::{AgentConfig, TaskConfig};
use crate::project::variables::VariableSet;
use crate::utilities::errors::{BuildError, CrewError};

/// Agents and tasks built by the engine, ready to form a crew.
#[derive(Debug)]
pub struct AssembledCrew<A, T> {
    /// Agent handles keyed by their name, in file order.
    pub agents: Vec<(String, A)>,
    /// Task handles in execution order.
    pub tasks: Vec<T>,
}

impl<A, T> AssembledCrew<A, T> {
    pub fn agent(&self, name: &str) -> Option<&A> {
        self.agents
            .iter()
            .find(|(agent_name, _)| agent_name == name)
            .map(|(_, agent)| agent)
    }

    pub fn agent_names(&self) -> Vec<String> {
        self.agents.iter().map(|(name, _)| name.clone()).collect()
    }

    /// Split into the engine's agent list and task list.
    pub fn into_parts(self) -> (Vec<A>, Vec<T>) {
        let agents = self.agents.into_iter().map(|(_, agent)| agent).collect();
        (agents, self.tasks)
    }
}

/// Builds a crew's agents and tasks through an [`Orchestrator`].
///
/// Agents are loaded and built first; the first failure aborts the run. Tasks
/// follow, each bound to the agent it names. A partial roster is never returned.
pub struct CrewAssembler<'a, E> {
    engine: &'a E,
    variables: &'a VariableSet,
    verbose: bool,
}

impl<'a, E: Orchestrator> CrewAssembler<'a, E> {
    pub fn new(engine: &'a E, variables: &'a VariableSet, verbose: bool) -> Self {
        Self {
            engine,
            variables,
            verbose,
        }
    }

    pub fn assemble(
        &self,
        agents_path: &Path,
        tasks_path: &Path,
    ) -> Result<AssembledCrew<E::Agent, E::Task>, CrewError> {
        let agent_configs = AgentConfig::load_all(agents_path, self.variables)
            .map_err(CrewError::from_agents_config)?;
        log::info!(
            "Loaded agents data: {:?}",
            agent_configs.iter().map(|a| a.name.as_str()).collect::<Vec<_>>()
        );

        let mut crew = AssembledCrew {
            agents: Vec::with_capacity(agent_configs.len()),
            tasks: Vec::new(),
        };

        for config in &agent_configs {
            log::info!("Creating agent: {}", config.name);
            let agent = self.build_agent(config).map_err(|source| {
                log::error!("Error creating agent {}: {}", config.name, source);
                CrewError::Agent {
                    name: config.name.clone(),
                    source,
                }
            })?;
            crew.agents.push((config.name.clone(), agent));
        }

        let task_configs = TaskConfig::load_all(tasks_path, self.variables)
            .map_err(CrewError::from_tasks_config)?;
        log::info!(
            "Loaded tasks data: {:?}",
            task_configs.iter().map(|t| t.name.as_str()).collect::<Vec<_>>()
        );

        for config in &task_configs {
            let task = self.build_task(config, &crew)?;
            crew.tasks.push(task);
        }

        log::info!("Number of agents: {}", crew.agents.len());
        log::info!("Number of tasks: {}", crew.tasks.len());

        if crew.agents.is_empty() {
            log::error!("No agents were created");
            return Err(CrewError::NoAgents);
        }
        if crew.tasks.is_empty() {
            log::error!("No tasks were created");
            return Err(CrewError::NoTasks);
        }

        Ok(crew)
    }

    fn build_agent(&self, config: &AgentConfig) -> Result<E::Agent, BuildError> {
        config.check_resolved()?;
        let spec = AgentSpec {
            name: config.name.clone(),
            role: config.role.clone(),
            goal: config.goal.clone(),
            backstory: config.backstory.clone(),
            verbose: self.verbose,
            allow_delegation: true,
        };
        Ok(self.engine.create_agent(&spec)?)
    }

    fn build_task(
        &self,
        config: &TaskConfig,
        crew: &AssembledCrew<E::Agent, E::Task>,
    ) -> Result<E::Task, CrewError> {
        let task_error = |source: BuildError| {
            log::error!("Error creating task {}: {}", config.name, source);
            CrewError::Task {
                name: config.name.clone(),
                source,
            }
        };

        config.check_resolved().map_err(task_error)?;

        let Some(agent) = crew.agent(&config.agent) else {
            let available = crew.agent_names();
            log::error!("Task {} has invalid agent: {}", config.name, config.agent);
            log::error!("Available agents: {:?}", available);
            return Err(CrewError::InvalidAgent {
                task: config.name.clone(),
                agent: config.agent.clone(),
                available,
            });
        };

        log::info!("Creating task: {} for agent: {}", config.name, config.agent);
        let spec = TaskSpec {
            name: config.name.clone(),
            description: config.description.clone(),
            expected_output: config.expected_output.clone(),
            agent: config.agent.clone(),
            output_file: config.output_file.clone(),
        };
        self.engine
            .create_task(&spec, agent)
            .map_err(|e| task_error(BuildError::Engine(e)))
    }
}
