//! Logging helpers for hlsplit
//!
//! The library only talks to the `log` facade; binaries pick the backend.
//! This module provides the pieces a binary needs on top of that:
//! - logging an external command exactly as it will be executed
//! - an optional log4rs file appender for persistent run logs
//! - timestamped log file names

use log::{LevelFilter, debug};
use log4rs::{
    append::file::FileAppender,
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{CoreError, CoreResult};

/// Logs the program and argument vector of `cmd` at debug level.
pub fn log_command(cmd: &Command) {
    let program = cmd.get_program().to_string_lossy();
    let args: Vec<_> = cmd.get_args().map(|arg| arg.to_string_lossy()).collect();
    debug!("Executing command: {} {}", program, args.join(" "));
}

/// Returns `<log_dir>/hlsplit_<YYYYMMDD_HHMMSS>.log`.
pub fn timestamped_log_path(log_dir: &Path) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    log_dir.join(format!("hlsplit_{stamp}.log"))
}

/// Installs a log4rs file logger as the global logger.
///
/// Fails if another logger was already installed.
pub fn setup_file_logging(log_file: &Path, log_level: LevelFilter) -> CoreResult<()> {
    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let config = file_logging_config(log_file, log_level)?;
    log4rs::init_config(config)
        .map_err(|e| CoreError::Config(format!("failed to install file logger: {e}")))?;

    Ok(())
}

/// Builds the log4rs configuration used by [`setup_file_logging`].
pub fn file_logging_config(log_file: &Path, log_level: LevelFilter) -> CoreResult<Config> {
    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] {t} - {m}{n}",
        )))
        .build(log_file)?;

    Config::builder()
        .appender(Appender::builder().build("file", Box::new(file_appender)))
        .build(Root::builder().appender("file").build(log_level))
        .map_err(|e| CoreError::Config(format!("invalid log configuration: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn log_path_is_timestamped_inside_dir() {
        let path = timestamped_log_path(Path::new("/var/log/hlsplit"));
        assert_eq!(path.parent(), Some(Path::new("/var/log/hlsplit")));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("hlsplit_"));
        assert!(name.ends_with(".log"));
        // hlsplit_ + YYYYMMDD_HHMMSS + .log
        assert_eq!(name.len(), "hlsplit_".len() + 15 + ".log".len());
    }

    #[test]
    fn file_config_creates_log_file() {
        let dir = tempdir().unwrap();
        let log_file = dir.path().join("run.log");
        let config = file_logging_config(&log_file, LevelFilter::Info).unwrap();
        assert_eq!(config.root().level(), LevelFilter::Info);
        assert!(log_file.exists());
    }
}
