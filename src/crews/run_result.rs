//! Result of one kickoff as returned to the tool caller.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Either `{"error": ...}` or `{"result": ..., "agent_outputs": ..., "errors": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RunResult {
    Failure {
        error: String,
    },
    Success {
        /// The engine's final result.
        result: Value,
        /// Console output of the agents, with model-client log lines removed.
        agent_outputs: String,
        /// Filtered stderr, or `None` when it was blank.
        errors: Option<String>,
    },
}

impl RunResult {
    pub fn failure(message: impl Into<String>) -> Self {
        RunResult::Failure {
            error: message.into(),
        }
    }

    /// Build a success record; blank `errors` become `None`.
    pub fn success(result: Value, agent_outputs: String, errors: String) -> Self {
        RunResult::Success {
            result,
            agent_outputs,
            errors: if errors.trim().is_empty() {
                None
            } else {
                Some(errors)
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RunResult::Success { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RunResult::Failure { error } => Some(error),
            RunResult::Success { .. } => None,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
