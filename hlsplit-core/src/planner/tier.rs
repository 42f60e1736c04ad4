//! Quality ceiling tiers.
//!
//! Each tier pins a reference height, a bitrate ceiling and a framerate
//! ceiling. The framerate ceilings sit just under the NTSC rates so that a
//! source at exactly 24000/1001 or 30000/1001 is still capped.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Fixed quality presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualityCeiling {
    #[serde(rename = "480p")]
    P480,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "1080p")]
    P1080,
}

/// Limits bound to a [`QualityCeiling`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierLimits {
    /// Reference height in pixels
    pub height: u32,
    /// Bitrate ceiling in bits per second
    pub bitrate_bps: u64,
    /// Framerate ceiling in frames per second
    pub framerate: f64,
}

const FILM_RATE_CAP: f64 = 24000.0 / 1001.0 - 0.005;
const NTSC_RATE_CAP: f64 = 30000.0 / 1001.0 - 0.005;

impl QualityCeiling {
    pub const ALL: [QualityCeiling; 3] = [Self::P480, Self::P720, Self::P1080];

    pub fn limits(self) -> TierLimits {
        match self {
            Self::P480 => TierLimits {
                height: 480,
                bitrate_bps: 500 * 1024,
                framerate: FILM_RATE_CAP,
            },
            Self::P720 => TierLimits {
                height: 720,
                bitrate_bps: 1000 * 1024,
                framerate: FILM_RATE_CAP,
            },
            Self::P1080 => TierLimits {
                height: 1080,
                bitrate_bps: 2000 * 1024,
                framerate: NTSC_RATE_CAP,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::P480 => "480p",
            Self::P720 => "720p",
            Self::P1080 => "1080p",
        }
    }
}

impl fmt::Display for QualityCeiling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityCeiling {
    type Err = CoreError;

    /// Accepts `480p`, `720p`, `1080p` or the bare height.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let height = normalized.strip_suffix('p').unwrap_or(&normalized);
        match height {
            "480" => Ok(Self::P480),
            "720" => Ok(Self::P720),
            "1080" => Ok(Self::P1080),
            _ => Err(CoreError::Config(format!(
                "unknown quality ceiling '{s}', expected 480p, 720p or 1080p"
            ))),
        }
    }
}
