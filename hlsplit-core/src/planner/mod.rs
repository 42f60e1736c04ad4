// ============================================================================
// hlsplit-core/src/planner/mod.rs
// ============================================================================
//
// PARAMETER PLANNER: Adaptive Encode Decisions
//
// Given probed stream metadata and an optional quality ceiling, decide what
// the encoder has to do. The rules, in order:
//
// 1. The input needs a video stream, an audio stream and a video container
//    extension, otherwise it is not transcodable.
// 2. With a ceiling requested and a source taller than the tier's reference
//    height, scale to that height and cap bitrate and framerate. A cap is
//    dropped when the source is already at or below it. Without a ceiling,
//    or when the source is not taller, nothing is capped.
// 3. Video is stream-copied when it is already H.264 and nothing is scaled.
//    Audio is stream-copied when it is already AAC.
//
// Malformed bit rates read as unbounded and malformed frame rates as 1/1;
// both are logged and never abort planning.
//
// AI-ASSISTANT-INFO: Pure planning function from probe metadata to TranscodePlan

// ---- Submodules ----
mod tier;

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};
use crate::media::FormatDescriptor;

// ---- External crate imports ----
use log::{debug, info};
use serde::{Deserialize, Serialize};

pub use tier::{QualityCeiling, TierLimits};

/// Video codec that can be stream-copied into HLS segments.
pub const COPYABLE_VIDEO_CODEC: &str = "h264";

/// Audio codec that can be stream-copied into HLS segments.
pub const COPYABLE_AUDIO_CODEC: &str = "aac";

pub const DEFAULT_VIDEO_ENCODER: &str = "libx264";
pub const DEFAULT_AUDIO_ENCODER: &str = "aac";

/// Caller supplied replacements for tier defaults and encoder names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanOverrides {
    /// Replaces the tier bitrate ceiling (bits/s). Still never exceeds the source.
    pub bitrate_bps: Option<u64>,

    /// Replaces the tier framerate ceiling. Still never exceeds the source.
    pub framerate: Option<f64>,

    pub video_encoder: Option<String>,

    pub audio_encoder: Option<String>,
}

/// What happens to one stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action", content = "encoder")]
pub enum CodecAction {
    Copy,
    Encode(String),
}

impl CodecAction {
    /// Value for ffmpeg's `-c:v` / `-c:a`.
    pub fn as_ffmpeg_arg(&self) -> &str {
        match self {
            CodecAction::Copy => "copy",
            CodecAction::Encode(encoder) => encoder,
        }
    }

    pub fn is_copy(&self) -> bool {
        matches!(self, CodecAction::Copy)
    }
}

/// Decided encode parameters. A copied video stream never carries targets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscodePlan {
    video: CodecAction,
    audio: CodecAction,
    scale_height: Option<u32>,
    bitrate_bps: Option<u64>,
    framerate: Option<f64>,
}

impl TranscodePlan {
    /// Plan that stream-copies video, so no targets can be attached.
    pub fn copy_video(audio: CodecAction) -> Self {
        Self {
            video: CodecAction::Copy,
            audio,
            scale_height: None,
            bitrate_bps: None,
            framerate: None,
        }
    }

    /// Plan that re-encodes video with the given targets.
    pub fn encode_video(
        encoder: impl Into<String>,
        audio: CodecAction,
        scale_height: Option<u32>,
        bitrate_bps: Option<u64>,
        framerate: Option<f64>,
    ) -> Self {
        Self {
            video: CodecAction::Encode(encoder.into()),
            audio,
            scale_height,
            bitrate_bps,
            framerate,
        }
    }

    pub fn video(&self) -> &CodecAction {
        &self.video
    }

    pub fn audio(&self) -> &CodecAction {
        &self.audio
    }

    pub fn scale_height(&self) -> Option<u32> {
        self.scale_height
    }

    pub fn bitrate_bps(&self) -> Option<u64> {
        self.bitrate_bps
    }

    pub fn framerate(&self) -> Option<f64> {
        self.framerate
    }

    /// True when neither stream is re-encoded.
    pub fn is_remux_only(&self) -> bool {
        self.video.is_copy() && self.audio.is_copy()
    }
}

/// Targets derived from a ceiling for one source.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct CeilingTargets {
    scale_height: Option<u32>,
    bitrate_bps: Option<u64>,
    framerate: Option<f64>,
}

/// Decides the encode parameters for `descriptor`.
pub fn plan(
    descriptor: &FormatDescriptor,
    ceiling: Option<QualityCeiling>,
    overrides: &PlanOverrides,
) -> CoreResult<TranscodePlan> {
    let name = &descriptor.format.filename;
    let (Some(video), Some(audio)) = (descriptor.video(), descriptor.audio()) else {
        return Err(CoreError::NotTranscodable(format!(
            "{name} needs both a video and an audio stream"
        )));
    };
    if !descriptor.is_video_container() {
        return Err(CoreError::NotTranscodable(format!(
            "{name} does not have a video container extension"
        )));
    }

    let targets = match ceiling {
        Some(ceiling) => ceiling_targets(ceiling, video, overrides),
        None => CeilingTargets::default(),
    };

    let audio_action = if audio.codec() == COPYABLE_AUDIO_CODEC {
        CodecAction::Copy
    } else {
        CodecAction::Encode(
            overrides
                .audio_encoder
                .clone()
                .unwrap_or_else(|| DEFAULT_AUDIO_ENCODER.to_string()),
        )
    };

    let plan = if video.codec() == COPYABLE_VIDEO_CODEC && targets.scale_height.is_none() {
        TranscodePlan::copy_video(audio_action)
    } else {
        let encoder = overrides
            .video_encoder
            .clone()
            .unwrap_or_else(|| DEFAULT_VIDEO_ENCODER.to_string());
        TranscodePlan::encode_video(
            encoder,
            audio_action,
            targets.scale_height,
            targets.bitrate_bps,
            targets.framerate,
        )
    };

    info!(
        "Plan for {name}: video={} audio={} scale={:?} bitrate={:?} framerate={:?}",
        plan.video().as_ffmpeg_arg(),
        plan.audio().as_ffmpeg_arg(),
        plan.scale_height(),
        plan.bitrate_bps(),
        plan.framerate()
    );
    Ok(plan)
}

fn ceiling_targets(
    ceiling: QualityCeiling,
    video: &crate::media::StreamDescriptor,
    overrides: &PlanOverrides,
) -> CeilingTargets {
    let limits = ceiling.limits();

    match video.height {
        Some(height) if height > limits.height => {}
        Some(height) => {
            debug!("Source height {height} is within {ceiling}, no scaling");
            return CeilingTargets::default();
        }
        None => {
            debug!("Source height unknown, not scaling to {ceiling}");
            return CeilingTargets::default();
        }
    }

    let bitrate_cap = overrides.bitrate_bps.unwrap_or(limits.bitrate_bps);
    let bitrate_bps = match video.bit_rate_bps() {
        Some(source) if source <= bitrate_cap => {
            debug!("Source bitrate {source} already within cap {bitrate_cap}");
            None
        }
        _ => Some(bitrate_cap),
    };

    let framerate_cap = overrides.framerate.unwrap_or(limits.framerate);
    let source_rate = video.frame_rate();
    let framerate = if source_rate.as_f64() <= framerate_cap {
        debug!("Source framerate {source_rate} already within cap {framerate_cap:.3}");
        None
    } else {
        Some(framerate_cap)
    };

    CeilingTargets {
        scale_height: Some(limits.height),
        bitrate_bps,
        framerate,
    }
}
