//! mcp-crew-ai tool host binary.
//!
//! Serves the `kickoff` MCP tool over stdio. Usually launched by the
//! `mcp-crew-ai` CLI, which passes its configuration through the environment.
//!
//! # Environment Variables
//!
//! - `MCP_CREW_AGENTS_FILE` / `MCP_CREW_TASKS_FILE`: default rosters
//! - `MCP_CREW_TOPIC`, `MCP_CREW_PROCESS`, `MCP_CREW_VERBOSE`, `MCP_CREW_VARIABLES`
//! - `MCP_CREW_RUNNER`: command that executes assembled crews (default: `crewai-runner`)
//! - `MCP_CREW_LOG_FILE`: log file (default: `crew_ai_server.log`)
//! - `RUST_LOG`: log filter (default: "info")
//!
//! # Usage
//!
//! ```bash
//! MCP_CREW_AGENTS_FILE=agents.yml MCP_CREW_TASKS_FILE=tasks.yml cargo run --bin mcp-crew-ai-server
//! ```

use std::sync::Arc;

use mcp_crew_ai::engine::CommandEngine;
use mcp_crew_ai::kickoff::CrewRunner;
use mcp_crew_ai::server::{serve_stdio, CrewServer, ServerSettings};
use mcp_crew_ai::utilities::logger::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    log::info!("Starting Crew AI Server");

    let settings = ServerSettings::from_env();
    settings.log_startup();

    let engine = CommandEngine::from_env()?;
    log::info!("Crew runner: {}", engine.command_line());

    let runner = CrewRunner::new(engine, settings.process, settings.verbose);
    let server = CrewServer::new(settings, Arc::new(runner));

    log::info!("Serving MCP over stdio");
    if let Err(e) = serve_stdio(server).await {
        log::error!("Server failed: {}", e);
        return Err(e);
    }
    log::info!("Client disconnected, shutting down");
    Ok(())
}
