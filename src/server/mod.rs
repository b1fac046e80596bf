//! MCP tool host for crew workflows.
//!
//! The host reads its configuration from `MCP_CREW_*` environment variables
//! (normally set by the `mcp-crew-ai` CLI) and serves one tool, `kickoff`,
//! over stdio.
//!
//! # Environment Variables
//!
//! - `MCP_CREW_AGENTS_FILE` / `MCP_CREW_TASKS_FILE`: roster files (default: bundled demos)
//! - `MCP_CREW_TOPIC`: default topic (default: "Artificial Intelligence")
//! - `MCP_CREW_PROCESS`: `sequential` (default) or `hierarchical`
//! - `MCP_CREW_VERBOSE`: `1` to make agents verbose
//! - `MCP_CREW_VARIABLES`: JSON object of extra template variables
//! - `MCP_CREW_VERSION`: version reported to clients

pub mod settings;
pub mod tool;

pub use settings::ServerSettings;
pub use tool::{serve_stdio, CrewServer, KickoffParams};
