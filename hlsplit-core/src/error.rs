// ============================================================================
// hlsplit-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Custom Error Types for hlsplit-core
//
// This module defines the error type used across the core library. Errors
// are grouped by the stage they surface in: input validation and tooling
// errors are raised before any process output is streamed, runtime errors
// carry the diagnostics captured from the failed process, and cancellation
// has its own variant so callers never confuse it with a failure.
//
// KEY COMPONENTS:
// - CoreError: Main error enum
// - CoreResult: Result alias
// - Helper constructors for process errors
//
// AI-ASSISTANT-INFO: Error types and helpers for the core library

// ---- External crate imports ----
use thiserror::Error;

// ---- Standard library imports ----
use std::io;
use std::process::ExitStatus;

/// Errors produced by hlsplit-core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Probe succeeded but the media lacks a video stream, an audio stream,
    /// or a recognised video container extension.
    #[error("Not a transcodable media file: {0}")]
    NotTranscodable(String),

    #[error("Required external command '{0}' not found or failed to execute.")]
    DependencyNotFound(String),

    #[error("Failed to start command '{command}': {source}")]
    CommandStart {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed waiting for command '{command}': {source}")]
    CommandWait {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The process ran and exited unsuccessfully. `output` holds the
    /// diagnostic text captured from it.
    #[error("Command '{command}' failed with {status}: {output}")]
    CommandFailed {
        command: String,
        status: ExitStatus,
        output: String,
    },

    #[error("Failed to parse ffprobe output: {0}")]
    ProbeParse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("No processable video files found in the input directory")]
    NoFilesFound,

    #[error("Path error: {0}")]
    PathError(String),

    #[error("Operation cancelled")]
    Cancelled,
}

/// Result alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// True when the error only reports cooperative cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CoreError::Cancelled)
    }
}

// ============================================================================
// HELPER CONSTRUCTORS
// ============================================================================

/// Maps a spawn failure, turning a missing executable into `DependencyNotFound`.
pub fn command_start_error(command: impl Into<String>, source: io::Error) -> CoreError {
    let command = command.into();
    if source.kind() == io::ErrorKind::NotFound {
        return CoreError::DependencyNotFound(command);
    }
    CoreError::CommandStart { command, source }
}

pub fn command_wait_error(command: impl Into<String>, source: io::Error) -> CoreError {
    CoreError::CommandWait {
        command: command.into(),
        source,
    }
}

pub fn command_failed_error(
    command: impl Into<String>,
    status: ExitStatus,
    output: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed {
        command: command.into(),
        status,
        output: output.into(),
    }
}
