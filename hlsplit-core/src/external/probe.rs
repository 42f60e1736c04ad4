// ============================================================================
// hlsplit-core/src/external/probe.rs
// ============================================================================
//
// STREAM PROBE: ffprobe Invocation and Decoding
//
// The prober runs ffprobe through a ProcessRunner in buffered mode and
// decodes its JSON report into a FormatDescriptor. Only stdout is parsed;
// anything ffprobe writes to stderr is kept for diagnostics.
//
// AI-ASSISTANT-INFO: ffprobe-based media probing behind the MediaProber trait

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};
use crate::external::process::ProcessRunner;
use crate::media::FormatDescriptor;

// ---- External crate imports ----
use log::debug;

// ---- Standard library imports ----
use std::path::Path;
use std::sync::Arc;

/// Source of stream metadata for a media file.
pub trait MediaProber: Send + Sync {
    fn probe(&self, input: &Path) -> CoreResult<FormatDescriptor>;
}

/// Argument vector for a full JSON probe of `input`.
pub fn probe_args(input: &Path) -> Vec<String> {
    vec![
        "-v".to_string(),
        "quiet".to_string(),
        "-print_format".to_string(),
        "json".to_string(),
        "-show_format".to_string(),
        "-show_streams".to_string(),
        input.to_string_lossy().into_owned(),
    ]
}

/// Decodes ffprobe's JSON report.
pub fn parse_probe_output(json: &str) -> CoreResult<FormatDescriptor> {
    serde_json::from_str(json).map_err(|e| CoreError::ProbeParse(e.to_string()))
}

/// [`MediaProber`] that shells out to ffprobe.
pub struct FfprobeProber {
    runner: Arc<dyn ProcessRunner>,
    program: String,
}

impl FfprobeProber {
    pub fn new(runner: Arc<dyn ProcessRunner>, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl MediaProber for FfprobeProber {
    fn probe(&self, input: &Path) -> CoreResult<FormatDescriptor> {
        let output = self.runner.run_captured(&self.program, &probe_args(input))?;
        if output.stdout.trim().is_empty() {
            return Err(CoreError::ProbeParse(format!(
                "ffprobe produced no output for {}",
                input.display()
            )));
        }
        let descriptor = parse_probe_output(&output.stdout)?;
        debug!(
            "Probed {}: {} stream(s), format {:?}",
            input.display(),
            descriptor.streams.len(),
            descriptor.format.format_name
        );
        Ok(descriptor)
    }
}
