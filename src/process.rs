//! Process strategies for crew execution.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the orchestration engine coordinates the tasks of a crew.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Process {
    /// Tasks are executed one after another, each handing off to the next.
    #[default]
    Sequential,
    /// A manager agent delegates tasks to the other agents.
    Hierarchical,
}

impl Process {
    /// Lenient parse used for environment values: anything that is not
    /// `hierarchical` (case-insensitive) is sequential.
    pub fn from_env_value(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("hierarchical") {
            Process::Hierarchical
        } else {
            Process::Sequential
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Process::Sequential => "sequential",
            Process::Hierarchical => "hierarchical",
        }
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Process {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" => Ok(Process::Sequential),
            "hierarchical" => Ok(Process::Hierarchical),
            other => Err(format!(
                "Invalid process type '{}'. Must be one of: sequential, hierarchical",
                other
            )),
        }
    }
}
