//! Process-wide logging: stderr plus an append-only log file.
//!
//! Stdout is left alone because the tool host speaks MCP over it.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use env_logger::{Env, Target, WriteStyle};

/// Overrides the log file location.
pub const LOG_FILE_ENV: &str = "MCP_CREW_LOG_FILE";
/// Log file used when [`LOG_FILE_ENV`] is unset, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "crew_ai_server.log";

/// Writes every line to a console stream and, when available, a log file.
pub struct TeeWriter<C> {
    console: C,
    file: Option<File>,
}

impl<C: Write> TeeWriter<C> {
    pub fn new(console: C, file: Option<File>) -> Self {
        Self { console, file }
    }
}

impl<C: Write> Write for TeeWriter<C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(file) = self.file.as_mut() {
            // Log file errors are ignored; the console copy is authoritative.
            let _ = file.write_all(buf);
        }
        self.console.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(file) = self.file.as_mut() {
            let _ = file.flush();
        }
        self.console.flush()
    }
}

/// Log file from `MCP_CREW_LOG_FILE`, or [`DEFAULT_LOG_FILE`].
pub fn log_file_path() -> PathBuf {
    std::env::var_os(LOG_FILE_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
}

/// Initialize logging to stderr and the default log file. Level defaults to `info`
/// and follows `RUST_LOG` when set. Calling it twice is harmless.
pub fn init_logging() {
    init_logging_to(&log_file_path());
}

pub fn init_logging_to(log_file: &Path) {
    let file = match OpenOptions::new().create(true).append(true).open(log_file) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("Could not open log file {}: {}", log_file.display(), e);
            None
        }
    };

    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {} - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
                record.target(),
                record.level(),
                record.args()
            )
        })
        .write_style(WriteStyle::Never)
        .target(Target::Pipe(Box::new(TeeWriter::new(io::stderr(), file))))
        .try_init();
}
