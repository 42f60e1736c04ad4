// ============================================================================
// hlsplit-core/src/encoding/command.rs
// ============================================================================
//
// ENCODE COMMAND: ffmpeg Argument Vector for HLS Output
//
// Turns an immutable TranscodePlan plus an output layout into the exact
// argument vector handed to ffmpeg. The vector is assembled once and never
// mutated afterwards; the input path is always preceded by `-i` near the
// front and the playlist path is always the final argument.
//
// AI-ASSISTANT-INFO: Builds ffmpeg HLS segmenting arguments from a TranscodePlan

// ---- Internal crate imports ----
use crate::planner::TranscodePlan;

// ---- Standard library imports ----
use std::path::{Path, PathBuf};

/// Bitstream filter applied to the video stream so copied H.264 is valid
/// inside MPEG-TS segments.
pub const VIDEO_BITSTREAM_FILTER: &str = "h264_mp4toannexb";

/// Where a split writes its playlist and segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentLayout {
    pub output_dir: PathBuf,
    pub playlist_name: String,
    pub segment_template: String,
    pub segment_duration_secs: u32,
}

impl SegmentLayout {
    pub fn playlist_path(&self) -> PathBuf {
        self.output_dir.join(&self.playlist_name)
    }

    pub fn segment_path_template(&self) -> PathBuf {
        self.output_dir.join(&self.segment_template)
    }
}

/// An ffmpeg invocation ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeCommand {
    args: Vec<String>,
}

impl EncodeCommand {
    /// Assembles the argument vector for splitting `input` according to `plan`.
    pub fn build(input: &Path, plan: &TranscodePlan, layout: &SegmentLayout) -> Self {
        let mut args: Vec<String> = vec![
            "-y".into(),
            "-i".into(),
            input.to_string_lossy().into_owned(),
            "-strict".into(),
            "-2".into(),
            "-c:v".into(),
            plan.video().as_ffmpeg_arg().to_string(),
            "-c:a".into(),
            plan.audio().as_ffmpeg_arg().to_string(),
            "-bsf:v".into(),
            VIDEO_BITSTREAM_FILTER.into(),
        ];

        if let Some(height) = plan.scale_height() {
            args.push("-vf".into());
            args.push(format!("scale=-2:{height}"));
        }
        if let Some(bitrate) = plan.bitrate_bps() {
            args.push("-b:v".into());
            args.push(format!("{}K", bitrate / 1024));
        }
        if let Some(framerate) = plan.framerate() {
            args.push("-r".into());
            args.push(format!("{framerate:.2}"));
        }

        args.extend([
            "-f".into(),
            "hls".into(),
            "-hls_list_size".into(),
            "0".into(),
            "-hls_time".into(),
            layout.segment_duration_secs.to_string(),
            "-hls_segment_filename".into(),
            layout.segment_path_template().to_string_lossy().into_owned(),
            layout.playlist_path().to_string_lossy().into_owned(),
        ]);

        Self { args }
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn into_args(self) -> Vec<String> {
        self.args
    }

    /// Space-joined form, for logs and dry runs.
    pub fn display_args(&self) -> String {
        self.args.join(" ")
    }
}
