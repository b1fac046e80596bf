//! MCP server exposing the single `kickoff` tool.

use std::collections::HashMap;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::transport::stdio;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServiceExt};
use schemars::JsonSchema;
use serde::Deserialize;

use super::settings::ServerSettings;
use crate::crews::RunResult;
use crate::kickoff::WorkflowRunner;

/// Name the server reports to MCP clients.
pub const SERVER_NAME: &str = "Crew AI Server";

/// Arguments of the `kickoff` tool. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct KickoffParams {
    /// Optional path to override the default agents YAML file
    #[serde(default)]
    pub agents_file: Option<String>,
    /// Optional path to override the default tasks YAML file
    #[serde(default)]
    pub tasks_file: Option<String>,
    /// The main topic for the crew to work on
    #[serde(default)]
    pub topic: Option<String>,
    /// Additional context variables for template formatting
    #[serde(default)]
    pub additional_context: Option<HashMap<String, serde_json::Value>>,
}

/// MCP server that runs the configured crew on request.
#[derive(Clone)]
pub struct CrewServer {
    settings: Arc<ServerSettings>,
    runner: Arc<dyn WorkflowRunner>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl CrewServer {
    pub fn new(settings: ServerSettings, runner: Arc<dyn WorkflowRunner>) -> Self {
        Self {
            settings: Arc::new(settings),
            runner,
            tool_router: Self::tool_router(),
        }
    }

    pub fn settings(&self) -> &ServerSettings {
        &self.settings
    }

    /// Resolve the call against the server settings and run it to completion.
    pub fn run_kickoff(&self, params: &KickoffParams) -> RunResult {
        log::info!(
            "Tool kickoff called with: agents_file={:?}, tasks_file={:?}, topic={:?}",
            params.agents_file,
            params.tasks_file,
            params.topic
        );
        let request = self.settings.resolve(params);
        self.runner.run(&request)
    }

    /// Execute a crew workflow using the YAML configuration files.
    #[tool(
        description = "Execute a CrewAI workflow using YAML configuration files. Returns the crew result and the agents' console output."
    )]
    async fn kickoff(
        &self,
        Parameters(params): Parameters<KickoffParams>,
    ) -> Result<CallToolResult, McpError> {
        let server = self.clone();
        let response = tokio::task::spawn_blocking(move || server.run_kickoff(&params))
            .await
            .unwrap_or_else(|e| {
                log::error!("Kickoff task failed: {}", e);
                RunResult::failure(format!("Error in crew kickoff: {}", e))
            });

        let body = response
            .to_json()
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(body)]))
    }
}

#[tool_handler]
impl rmcp::ServerHandler for CrewServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Use the 'kickoff' tool to run the configured crew of agents on a topic.".into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: self.settings.version.clone(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Serve `server` over stdin/stdout until the client disconnects.
pub async fn serve_stdio(server: CrewServer) -> anyhow::Result<()> {
    let service = server.serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kickoff::WorkflowRequest;
    use rmcp::ServerHandler;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingRunner {
        requests: Mutex<Vec<WorkflowRequest>>,
    }

    impl WorkflowRunner for RecordingRunner {
        fn run(&self, request: &WorkflowRequest) -> RunResult {
            self.requests.lock().unwrap().push(request.clone());
            RunResult::success(serde_json::json!("ok"), "out".into(), String::new())
        }
    }

    fn settings() -> ServerSettings {
        ServerSettings::from_lookup(|key| match key {
            "MCP_CREW_TOPIC" => Some("Oceans".to_string()),
            "MCP_CREW_VERSION" => Some("1.2.3".to_string()),
            _ => None,
        })
    }

    #[test]
    fn test_run_kickoff_delegates_resolved_request() {
        let runner = Arc::new(RecordingRunner::default());
        let server = CrewServer::new(settings(), runner.clone());

        let result = server.run_kickoff(&KickoffParams {
            topic: Some("Deserts".to_string()),
            ..Default::default()
        });
        assert!(result.is_success());

        let requests = runner.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].topic, "Deserts");
        assert_eq!(requests[0].agents_file, server.settings().agents_file);
    }

    struct FailingRunner;

    impl WorkflowRunner for FailingRunner {
        fn run(&self, _request: &WorkflowRequest) -> RunResult {
            RunResult::failure("No agents were created")
        }
    }

    fn response_body(result: CallToolResult) -> serde_json::Value {
        assert_eq!(result.content.len(), 1);
        let text = &result.content[0].as_text().unwrap().text;
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn test_kickoff_tool_runs_off_the_async_runtime() {
        let runner = Arc::new(RecordingRunner::default());
        let server = CrewServer::new(settings(), runner.clone());

        let outcome = tokio_test::block_on(server.kickoff(Parameters(KickoffParams::default())));
        assert_eq!(runner.requests.lock().unwrap()[0].topic, "Oceans");

        let body = response_body(outcome.unwrap());
        assert_eq!(
            body,
            serde_json::json!({"result": "ok", "agent_outputs": "out", "errors": null})
        );
    }

    #[test]
    fn test_kickoff_tool_reports_failure_record() {
        let server = CrewServer::new(settings(), Arc::new(FailingRunner));

        let outcome = tokio_test::block_on(server.kickoff(Parameters(KickoffParams::default())));
        let body = response_body(outcome.unwrap());
        assert_eq!(body, serde_json::json!({"error": "No agents were created"}));
    }

    #[test]
    fn test_server_info_reports_name_and_version() {
        let server = CrewServer::new(settings(), Arc::new(RecordingRunner::default()));
        let info = server.get_info();
        assert_eq!(info.server_info.name, SERVER_NAME);
        assert_eq!(info.server_info.version, "1.2.3");
        assert!(info.capabilities.tools.is_some());
    }

    #[test]
    fn test_params_accept_missing_fields() {
        let params: KickoffParams =
            serde_json::from_str(r#"{"additional_context": {"audience": "kids"}}"#).unwrap();
        assert!(params.agents_file.is_none());
        assert_eq!(
            params.additional_context.unwrap()["audience"],
            serde_json::json!("kids")
        );
    }
}
