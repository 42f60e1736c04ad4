// ============================================================================
// hlsplit-core/src/media/info.rs
// ============================================================================
//
// MEDIA INFORMATION: Probed Stream and Container Metadata
//
// These types mirror the JSON that `ffprobe -print_format json -show_format
// -show_streams` emits. Numeric values that ffprobe reports as strings
// (bit rates, durations, sample rates) stay strings here and are parsed on
// access, because ffprobe omits or garbles them for some containers and a
// bad value must read as "unknown" rather than fail the whole probe.
//
// KEY COMPONENTS:
// - FormatDescriptor: container plus ordered streams
// - StreamDescriptor / StreamKind: one elementary stream
// - FrameRate: exact rational frame rate
// - is_video_path: extension based container check
//
// AI-ASSISTANT-INFO: Probe metadata model and derived queries

// ---- External crate imports ----
use log::warn;
use serde::{Deserialize, Serialize};

// ---- Standard library imports ----
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// File extensions recognised as video containers (lowercase).
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "m4v", "mkv", "mov", "avi", "wmv", "flv", "webm", "ts", "m2ts", "mts", "mpg", "mpeg",
    "3gp", "ogv", "rmvb", "vob",
];

/// True if `path` has one of [`VIDEO_EXTENSIONS`], ignoring case.
pub fn is_video_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            VIDEO_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Kind of an elementary stream, from ffprobe's `codec_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum StreamKind {
    Video,
    Audio,
    Subtitle,
    Data,
    Attachment,
    #[default]
    Other,
}

impl From<String> for StreamKind {
    fn from(codec_type: String) -> Self {
        match codec_type.as_str() {
            "video" => StreamKind::Video,
            "audio" => StreamKind::Audio,
            "subtitle" => StreamKind::Subtitle,
            "data" => StreamKind::Data,
            "attachment" => StreamKind::Attachment,
            _ => StreamKind::Other,
        }
    }
}

/// Exact frame rate as `num/den`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRate {
    pub num: u64,
    pub den: u64,
}

impl FrameRate {
    pub const UNIT: FrameRate = FrameRate { num: 1, den: 1 };

    /// Parses `"num/den"`, or a bare integer as `num/1`. Zero denominators
    /// are rejected.
    pub fn parse(raw: &str) -> Option<FrameRate> {
        let raw = raw.trim();
        let (num, den) = match raw.split_once('/') {
            Some((num, den)) => (num.trim().parse().ok()?, den.trim().parse().ok()?),
            None => (raw.parse().ok()?, 1),
        };
        (den != 0).then_some(FrameRate { num, den })
    }

    /// Like [`parse`](Self::parse) but falls back to `1/1`, logging the
    /// malformed value.
    pub fn parse_or_unit(raw: &str) -> FrameRate {
        Self::parse(raw).unwrap_or_else(|| {
            warn!("Unparsable frame rate '{raw}', assuming 1/1");
            Self::UNIT
        })
    }

    pub fn as_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// One elementary stream as reported by ffprobe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    #[serde(default)]
    pub index: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec_name: Option<String>,

    #[serde(rename = "codec_type", default)]
    pub kind: StreamKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pix_fmt: Option<String>,

    /// Raw rational, e.g. `"24000/1001"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r_frame_rate: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_frame_rate: Option<String>,

    /// Bits per second as text. Absent for many containers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bit_rate: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_layout: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl StreamDescriptor {
    pub fn is_video(&self) -> bool {
        self.kind == StreamKind::Video
    }

    pub fn is_audio(&self) -> bool {
        self.kind == StreamKind::Audio
    }

    pub fn codec(&self) -> &str {
        self.codec_name.as_deref().unwrap_or("")
    }

    /// Frame rate from `r_frame_rate`, `1/1` if absent or malformed.
    pub fn frame_rate(&self) -> FrameRate {
        match self.r_frame_rate.as_deref() {
            Some(raw) => FrameRate::parse_or_unit(raw),
            None => {
                warn!("Stream {} has no r_frame_rate, assuming 1/1", self.index);
                FrameRate::UNIT
            }
        }
    }

    /// Declared bit rate. `None` means unknown, which callers treat as
    /// unbounded.
    pub fn bit_rate_bps(&self) -> Option<u64> {
        let raw = self.bit_rate.as_deref()?;
        match raw.trim().parse::<u64>() {
            Ok(bps) => Some(bps),
            Err(e) => {
                warn!("Unparsable bit rate '{raw}' on stream {}: {e}", self.index);
                None
            }
        }
    }

    pub fn language(&self) -> Option<&str> {
        self.tags.get("language").map(String::as_str)
    }
}

/// Container level metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerInfo {
    #[serde(default)]
    pub filename: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_long_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bit_rate: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

/// Everything ffprobe reported about one file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormatDescriptor {
    #[serde(default)]
    pub streams: Vec<StreamDescriptor>,

    #[serde(default)]
    pub format: ContainerInfo,
}

impl FormatDescriptor {
    /// First video stream, if any.
    pub fn video(&self) -> Option<&StreamDescriptor> {
        self.streams.iter().find(|s| s.is_video())
    }

    /// First audio stream, if any.
    pub fn audio(&self) -> Option<&StreamDescriptor> {
        self.streams.iter().find(|s| s.is_audio())
    }

    /// Judged by the extension of the probed file name only.
    pub fn is_video_container(&self) -> bool {
        is_video_path(Path::new(&self.format.filename))
    }

    /// Container duration in seconds, falling back to the video stream's.
    pub fn duration_secs(&self) -> Option<f64> {
        let parse = |raw: Option<&str>| {
            raw.and_then(|d| d.trim().parse::<f64>().ok())
                .filter(|d| d.is_finite() && *d > 0.0)
        };
        parse(self.format.duration.as_deref())
            .or_else(|| parse(self.video().and_then(|v| v.duration.as_deref())))
    }

    pub fn size_bytes(&self) -> Option<u64> {
        self.format.size.as_deref()?.trim().parse().ok()
    }
}
