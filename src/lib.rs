//! # MCP Crew AI
//!
//! Runs a crew of AI agents, described in YAML, behind a single MCP tool.
//!
//! Agents and tasks are loaded from two YAML rosters with `{name}` template
//! variables filled in, assembled through an [`engine::Orchestrator`], and
//! kicked off while their console output is captured. The `mcp-crew-ai`
//! binary validates the rosters and launches the `mcp-crew-ai-server` tool
//! host, which exposes the `kickoff` tool over stdio.

pub mod cli;
pub mod crew;
pub mod crews;
pub mod engine;
pub mod kickoff;
pub mod process;
pub mod project;
pub mod server;
pub mod utilities;

pub use crew::{AssembledCrew, CrewAssembler};
pub use crews::RunResult;
pub use engine::{CommandEngine, Orchestrator, OutputCapture};
pub use kickoff::{CrewRunner, WorkflowRequest, WorkflowRunner};
pub use process::Process;
pub use project::variables::VariableSet;
pub use server::{CrewServer, ServerSettings};

/// Crate version, reported by `--version` and to MCP clients.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
