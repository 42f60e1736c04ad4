//! Configuration structures and constants for the hlsplit-core library.
//!
//! Two kinds of configuration live here: [`ToolPaths`], which says where the
//! external binaries are and how long to wait for a cancelled one, and
//! [`SplitOptions`], which controls a single split request.

mod builder;
pub mod utils;

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::planner::{PlanOverrides, QualityCeiling};

pub use builder::SplitOptionsBuilder;

// Default constants

/// Default HLS segment length in seconds.
pub const DEFAULT_SEGMENT_DURATION_SECS: u32 = 10;

/// Playlist file written into the output directory.
pub const DEFAULT_PLAYLIST_NAME: &str = "media.m3u8";

/// Segment file name template, expanded by ffmpeg.
pub const DEFAULT_SEGMENT_TEMPLATE: &str = "media-%05d.ts";

pub const DEFAULT_FFMPEG: &str = "ffmpeg";
pub const DEFAULT_FFPROBE: &str = "ffprobe";

/// How long a killed child is polled for exit before it is abandoned.
pub const DEFAULT_REAP_GRACE: Duration = Duration::from_secs(5);

// Environment variable names

pub const ENV_FFMPEG: &str = "HLSPLIT_FFMPEG";
pub const ENV_FFPROBE: &str = "HLSPLIT_FFPROBE";
pub const ENV_REAP_GRACE_SECS: &str = "HLSPLIT_REAP_GRACE_SECS";

/// Locations of the external tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from(DEFAULT_FFMPEG),
            ffprobe: PathBuf::from(DEFAULT_FFPROBE),
        }
    }
}

impl ToolPaths {
    /// Reads `HLSPLIT_FFMPEG` and `HLSPLIT_FFPROBE`, falling back to the
    /// binaries found on `PATH`.
    pub fn from_env() -> Self {
        Self {
            ffmpeg: utils::get_env_path(ENV_FFMPEG, PathBuf::from(DEFAULT_FFMPEG)),
            ffprobe: utils::get_env_path(ENV_FFPROBE, PathBuf::from(DEFAULT_FFPROBE)),
        }
    }

    pub fn ffmpeg_program(&self) -> String {
        self.ffmpeg.to_string_lossy().into_owned()
    }

    pub fn ffprobe_program(&self) -> String {
        self.ffprobe.to_string_lossy().into_owned()
    }
}

/// Grace period used by the system process runner, honouring
/// `HLSPLIT_REAP_GRACE_SECS`.
pub fn reap_grace_from_env() -> Duration {
    utils::get_env_secs(ENV_REAP_GRACE_SECS, DEFAULT_REAP_GRACE)
}

/// Options for one split request.
///
/// # Examples
///
/// ```rust
/// use hlsplit_core::config::SplitOptionsBuilder;
/// use hlsplit_core::planner::QualityCeiling;
///
/// let options = SplitOptionsBuilder::new()
///     .quality_ceiling(Some(QualityCeiling::P720))
///     .segment_duration_secs(6)
///     .build();
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitOptions {
    /// Tier bounding resolution, bitrate and framerate. `None` keeps the
    /// source dimensions.
    pub quality_ceiling: Option<QualityCeiling>,

    /// Target HLS segment length in seconds
    pub segment_duration_secs: u32,

    /// Write into a fresh `<output_dir>/<uuid>` directory per request
    pub auto_output_dir: bool,

    pub overrides: PlanOverrides,

    pub playlist_name: String,

    pub segment_template: String,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            quality_ceiling: None,
            segment_duration_secs: DEFAULT_SEGMENT_DURATION_SECS,
            auto_output_dir: true,
            overrides: PlanOverrides::default(),
            playlist_name: DEFAULT_PLAYLIST_NAME.to_string(),
            segment_template: DEFAULT_SEGMENT_TEMPLATE.to_string(),
        }
    }
}

impl SplitOptions {
    /// Checks the options for values ffmpeg would reject or misplace.
    pub fn validate(&self) -> CoreResult<()> {
        if self.segment_duration_secs == 0 {
            return Err(CoreError::Config(
                "segment duration must be greater than zero".to_string(),
            ));
        }
        for (label, name) in [
            ("playlist name", &self.playlist_name),
            ("segment template", &self.segment_template),
        ] {
            if name.trim().is_empty() {
                return Err(CoreError::Config(format!("{label} must not be empty")));
            }
            if name.contains('/') || name.contains('\\') {
                return Err(CoreError::Config(format!(
                    "{label} '{name}' must be a bare file name"
                )));
            }
        }
        if !self.segment_template.contains('%') {
            return Err(CoreError::Config(format!(
                "segment template '{}' needs a numeric placeholder such as %05d",
                self.segment_template
            )));
        }
        if let Some(bitrate) = self.overrides.bitrate_bps {
            if bitrate < 1024 {
                return Err(CoreError::Config(format!(
                    "bitrate override {bitrate} is below 1024 bits/s"
                )));
            }
        }
        if let Some(framerate) = self.overrides.framerate {
            if !framerate.is_finite() || framerate <= 0.0 {
                return Err(CoreError::Config(format!(
                    "framerate override {framerate} must be a positive number"
                )));
            }
        }
        for (label, encoder) in [
            ("video encoder", &self.overrides.video_encoder),
            ("audio encoder", &self.overrides.audio_encoder),
        ] {
            if let Some(encoder) = encoder {
                if encoder.trim().is_empty() || encoder == "copy" {
                    return Err(CoreError::Config(format!(
                        "{label} override must name an encoder, got '{encoder}'"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_hls_layout() {
        let options = SplitOptions::default();
        assert_eq!(options.segment_duration_secs, 10);
        assert_eq!(options.playlist_name, "media.m3u8");
        assert_eq!(options.segment_template, "media-%05d.ts");
        assert!(options.auto_output_dir);
        assert!(options.quality_ceiling.is_none());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn zero_segment_duration_is_rejected() {
        let options = SplitOptions {
            segment_duration_secs: 0,
            ..SplitOptions::default()
        };
        assert!(matches!(options.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn nested_playlist_name_is_rejected() {
        let options = SplitOptions {
            playlist_name: "sub/media.m3u8".to_string(),
            ..SplitOptions::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn template_without_placeholder_is_rejected() {
        let options = SplitOptions {
            segment_template: "media.ts".to_string(),
            ..SplitOptions::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn copy_is_not_an_encoder_override() {
        let mut options = SplitOptions::default();
        options.overrides.video_encoder = Some("copy".to_string());
        assert!(options.validate().is_err());
    }

    #[test]
    fn tool_paths_default_to_path_lookup() {
        let tools = ToolPaths::default();
        assert_eq!(tools.ffmpeg_program(), "ffmpeg");
        assert_eq!(tools.ffprobe_program(), "ffprobe");
    }
}
