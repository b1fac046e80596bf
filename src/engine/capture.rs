//! Per-run capture of the engine's console output.

use std::io::Write;

/// Marker of the model-client library whose log lines are dropped from results.
pub const NOISY_LOG_MARKER: &str = "LiteLLM";

/// Buffers standing in for stdout and stderr during one kickoff.
///
/// Each run owns its own capture, so concurrent runs never share buffers and the
/// real process streams are never redirected.
#[derive(Debug, Default)]
pub struct OutputCapture {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

/// Decoded text of a finished capture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
}

impl OutputCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer for text the engine would print to stdout.
    pub fn stdout(&mut self) -> &mut dyn Write {
        &mut self.stdout
    }

    /// Writer for text the engine would print to stderr.
    pub fn stderr(&mut self) -> &mut dyn Write {
        &mut self.stderr
    }

    /// Finish the capture, decoding both streams lossily.
    pub fn finish(self) -> CapturedOutput {
        CapturedOutput {
            stdout: String::from_utf8_lossy(&self.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&self.stderr).into_owned(),
        }
    }
}

/// Drop bracket-prefixed model-client log lines; every other line is kept as is.
pub fn format_output(output: &str) -> String {
    output
        .split('\n')
        .filter(|line| !(line.trim().starts_with('[') && line.contains(NOISY_LOG_MARKER)))
        .collect::<Vec<_>>()
        .join("\n")
}
