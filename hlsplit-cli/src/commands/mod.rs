//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command. The
//! helpers here resolve the external tools the same way for all of them.

pub mod check;
pub mod probe;
pub mod split;

use hlsplit_core::config::reap_grace_from_env;
use hlsplit_core::{SystemProcessRunner, ToolPaths};
use std::path::PathBuf;
use std::sync::Arc;

/// Tool paths from the command line, falling back to plain names on `PATH`.
///
/// clap has already consulted `HLSPLIT_FFMPEG` / `HLSPLIT_FFPROBE`.
pub fn tool_paths(ffmpeg: Option<PathBuf>, ffprobe: Option<PathBuf>) -> ToolPaths {
    let defaults = ToolPaths::default();
    ToolPaths {
        ffmpeg: ffmpeg.unwrap_or(defaults.ffmpeg),
        ffprobe: ffprobe.unwrap_or(defaults.ffprobe),
    }
}

pub(crate) fn system_runner() -> Arc<SystemProcessRunner> {
    Arc::new(SystemProcessRunner::new().with_reap_grace(reap_grace_from_env()))
}
