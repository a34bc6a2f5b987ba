use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone};
use std::io;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Timestamp layout of per-run log files, e.g. `2024_05_01__18_30_00.log`.
const LOG_FILE_STAMP: &str = "%Y_%m_%d__%H_%M_%S";
const LOG_FILE_EXTENSION: &str = "log";

/// Keeps the background log writer alive. Dropping it flushes the log file.
pub struct LogGuard {
    _worker: Option<WorkerGuard>,
    file: Option<PathBuf>,
}

impl LogGuard {
    /// The log file of this session, if one is being written.
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }
}

/// Name of the log file for a session started at `started`.
pub fn log_file_name<Tz: TimeZone>(started: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}.{LOG_FILE_EXTENSION}", started.format(LOG_FILE_STAMP))
}

/// Installs the global subscriber. Lines always go to stderr; with `log_dir`
/// they are also written to a fresh timestamped file in that directory.
///
/// `RUST_LOG` overrides the level, otherwise `info` (or `debug` when `verbose`).
pub fn init_logging(log_dir: Option<&Path>, verbose: bool) -> Result<LogGuard> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let Some(dir) = log_dir else {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_target(false)
            .with_env_filter(filter)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .context("Failed to install log subscriber")?;
        return Ok(LogGuard {
            _worker: None,
            file: None,
        });
    };

    // With Rotation::NEVER the prefix is used verbatim as the file name.
    let file_name = log_file_name(&Local::now());
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(&file_name)
        .build(dir)
        .with_context(|| format!("Failed to create log file in {}", dir.display()))?;
    let (file_writer, worker) = tracing_appender::non_blocking(appender);

    let subscriber = tracing_subscriber::fmt()
        .with_writer(file_writer.and(io::stderr))
        .with_target(false)
        .with_ansi(false)
        .with_env_filter(filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install log subscriber")?;

    Ok(LogGuard {
        _worker: Some(worker),
        file: Some(dir.join(file_name)),
    })
}
