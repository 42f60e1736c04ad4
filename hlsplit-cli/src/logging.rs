// ============================================================================
// hlsplit-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: Console and optional file logging for the binary
//
// Console logging goes through env_logger. RUST_LOG wins when it is set;
// otherwise the level comes from the number of -v flags. With --log-dir the
// core's log4rs file appender is installed instead, so every record lands in
// a timestamped file.
//
// KEY COMPONENTS:
// - level_for_verbosity: -v count to LevelFilter
// - init_logging: installs the backend for this process
//
// AI-ASSISTANT-INFO: Logging backend selection for the CLI

// ---- Internal crate imports ----
use crate::error::CliResult;

// ---- External crate imports ----
use anyhow::Context;
use log::LevelFilter;

// ---- Standard library imports ----
use std::path::{Path, PathBuf};

/// Console level for a given number of `-v` flags.
pub fn level_for_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Installs the global logger. Returns the log file path when one was set up.
pub fn init_logging(verbose: u8, log_dir: Option<&Path>) -> CliResult<Option<PathBuf>> {
    let level = level_for_verbosity(verbose);

    if let Some(dir) = log_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
        let path = hlsplit_core::logging::timestamped_log_path(dir);
        hlsplit_core::logging::setup_file_logging(&path, level)
            .with_context(|| format!("Failed to set up log file {}", path.display()))?;
        return Ok(Some(path));
    }

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .try_init()
        .context("Failed to initialise console logging")?;
    Ok(None)
}
