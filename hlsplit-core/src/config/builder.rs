// ============================================================================
// hlsplit-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for SplitOptions
//
// Fluent construction of SplitOptions with the library defaults filled in.
// Validation stays on SplitOptions::validate so options built by hand and
// options built here go through the same checks.
//
// AI-ASSISTANT-INFO: Builder pattern implementation for SplitOptions

// ---- Internal crate imports ----
use super::SplitOptions;
use crate::planner::{PlanOverrides, QualityCeiling};

/// Builder for [`SplitOptions`].
///
/// ```rust
/// use hlsplit_core::config::SplitOptionsBuilder;
/// use hlsplit_core::planner::QualityCeiling;
///
/// let options = SplitOptionsBuilder::new()
///     .quality_ceiling(Some(QualityCeiling::P1080))
///     .auto_output_dir(false)
///     .video_encoder("libx265")
///     .bitrate_bps(1_500_000)
///     .build();
/// assert_eq!(options.overrides.bitrate_bps, Some(1_500_000));
/// ```
#[derive(Debug, Clone)]
pub struct SplitOptionsBuilder {
    options: SplitOptions,
}

impl Default for SplitOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SplitOptionsBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            options: SplitOptions::default(),
        }
    }

    #[must_use]
    pub fn quality_ceiling(mut self, ceiling: Option<QualityCeiling>) -> Self {
        self.options.quality_ceiling = ceiling;
        self
    }

    #[must_use]
    pub fn segment_duration_secs(mut self, secs: u32) -> Self {
        self.options.segment_duration_secs = secs;
        self
    }

    #[must_use]
    pub fn auto_output_dir(mut self, auto: bool) -> Self {
        self.options.auto_output_dir = auto;
        self
    }

    /// Replaces all plan overrides at once.
    #[must_use]
    pub fn overrides(mut self, overrides: PlanOverrides) -> Self {
        self.options.overrides = overrides;
        self
    }

    #[must_use]
    pub fn bitrate_bps(mut self, bitrate: u64) -> Self {
        self.options.overrides.bitrate_bps = Some(bitrate);
        self
    }

    #[must_use]
    pub fn framerate(mut self, framerate: f64) -> Self {
        self.options.overrides.framerate = Some(framerate);
        self
    }

    #[must_use]
    pub fn video_encoder(mut self, encoder: impl Into<String>) -> Self {
        self.options.overrides.video_encoder = Some(encoder.into());
        self
    }

    #[must_use]
    pub fn audio_encoder(mut self, encoder: impl Into<String>) -> Self {
        self.options.overrides.audio_encoder = Some(encoder.into());
        self
    }

    #[must_use]
    pub fn playlist_name(mut self, name: impl Into<String>) -> Self {
        self.options.playlist_name = name.into();
        self
    }

    #[must_use]
    pub fn segment_template(mut self, template: impl Into<String>) -> Self {
        self.options.segment_template = template.into();
        self
    }

    #[must_use]
    pub fn build(self) -> SplitOptions {
        self.options
    }
}
