use std::{fs, path::Path};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::infra::{config::LogConfig, error::AppError};

/// Keeps the background log writer alive; dropping it flushes pending lines.
#[must_use]
pub struct LogGuard {
    _worker: WorkerGuard,
}

/// Routes `tracing` output to `log_file`. The terminal belongs to the TUI, so
/// nothing is written to stdout or stderr.
pub fn init(config: &LogConfig, log_file: &Path) -> Result<LogGuard, AppError> {
    let (directory, file_name) = split_log_path(log_file)?;
    fs::create_dir_all(directory).map_err(|source| AppError::StorageDirCreate {
        path: directory.to_path_buf(),
        source,
    })?;

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, worker) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level)),
        )
        .with_target(true)
        .with_ansi(false)
        .with_writer(writer)
        .try_init()
        .map_err(AppError::LoggingInit)?;

    Ok(LogGuard { _worker: worker })
}

fn split_log_path(log_file: &Path) -> Result<(&Path, &std::ffi::OsStr), AppError> {
    let file_name = log_file
        .file_name()
        .ok_or_else(|| AppError::ConfigInvalid {
            field: "logging.file",
            details: format!("{} has no file name", log_file.display()),
        })?;
    let directory = log_file
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    Ok((directory, file_name))
}
