//! Crew execution results.

pub mod run_result;

pub use run_result::RunResult;
