// ============================================================================
// hlsplit-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Result alias and exit codes
//
// Errors from hlsplit-core are wrapped with anyhow context at the command
// boundary. main() maps the final error to a process exit code.
//
// KEY COMPONENTS:
// - CliResult: Type alias for CLI operations
// - exit_code: Maps an outcome to 0 / 1 / 130
//
// AI-ASSISTANT-INFO: CLI error handling and exit code mapping

// ---- Internal crate imports ----
use hlsplit_core::CoreError;

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Type alias for CLI results.
pub type CliResult<T> = anyhow::Result<T>;

// ============================================================================
// EXIT CODES
// ============================================================================

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
/// Same code a shell reports for a process stopped by SIGINT.
pub const EXIT_CANCELLED: i32 = 130;

/// True when cancellation appears anywhere in the error's source chain.
pub fn is_cancellation(err: &anyhow::Error) -> bool {
    err.chain()
        .any(|cause| matches!(cause.downcast_ref::<CoreError>(), Some(CoreError::Cancelled)))
}

/// Exit code for the result of a command.
pub fn exit_code<T>(result: &CliResult<T>) -> i32 {
    match result {
        Ok(_) => EXIT_SUCCESS,
        Err(e) if is_cancellation(e) => EXIT_CANCELLED,
        Err(_) => EXIT_FAILURE,
    }
}
