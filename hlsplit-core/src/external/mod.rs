// ============================================================================
// hlsplit-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg and ffprobe
//
// Everything that starts an external process goes through the ProcessRunner
// trait defined here, so the rest of the crate can be exercised with a
// scripted runner in tests.
//
// KEY COMPONENTS:
// - ProcessRunner / SystemProcessRunner: buffered and streaming execution
// - MediaProber / FfprobeProber: stream metadata via ffprobe
// - check_dependency: verifies a configured binary can be started
//
// AI-ASSISTANT-INFO: External tool interactions and abstractions for ffmpeg/ffprobe

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};

// ---- External crate imports ----
use log::{debug, info};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Traits and implementations for running external processes
pub mod process;

/// Traits and implementations for probing media with ffprobe
pub mod probe;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use probe::{FfprobeProber, MediaProber, probe_args};
pub use process::{ProcessOutput, ProcessRunner, SystemProcessRunner};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks that `program` can be started by running `program -version`.
///
/// Returns the first line of its version banner. A missing binary, or one
/// that cannot run, is reported as `CoreError::DependencyNotFound`.
pub fn check_dependency(runner: &dyn ProcessRunner, program: &str) -> CoreResult<String> {
    let args = vec!["-version".to_string()];
    match runner.run_buffered(program, &args) {
        Ok(output) => {
            let banner = output.lines().next().unwrap_or_default().trim().to_string();
            info!("Found {program}: {banner}");
            Ok(banner)
        }
        Err(CoreError::DependencyNotFound(name)) => Err(CoreError::DependencyNotFound(name)),
        Err(e) => {
            debug!("Dependency check for {program} failed: {e}");
            Err(CoreError::DependencyNotFound(program.to_string()))
        }
    }
}
