//! ffmpeg status line parsing
//!
//! ffmpeg reports progress on stderr with lines such as
//! `frame=  240 fps= 48 q=28.0 size=    1024kB time=00:00:10.01 bitrate= 838.1kbits/s speed=2.01x`.
//! [`ProgressTracker`] turns those lines into [`ProgressUpdate`]s measured
//! against the probed duration and rate-limits them for display.

use serde::Serialize;

/// Parses ffmpeg's `HH:MM:SS.ms` time format to seconds.
#[must_use]
pub fn parse_ffmpeg_time(time: &str) -> Option<f64> {
    let parts: Vec<&str> = time.split(':').collect();
    if parts.len() == 3 {
        let hours = parts[0].parse::<f64>().ok()?;
        let minutes = parts[1].parse::<f64>().ok()?;
        let seconds = parts[2].parse::<f64>().ok()?;
        Some(hours * 3600.0 + minutes * 60.0 + seconds)
    } else {
        None
    }
}

/// Formats seconds as `HH:MM:SS`.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??".to_string();
    }

    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Value of `key=` in an ffmpeg status line. ffmpeg pads values with spaces
/// (`fps= 48`), so leading whitespace after `=` is skipped.
fn field<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let needle = format!("{key}=");
    let mut search = line;
    loop {
        let idx = search.find(&needle)?;
        let preceded_ok = idx == 0
            || search[..idx]
                .chars()
                .next_back()
                .is_some_and(char::is_whitespace);
        let rest = &search[idx + needle.len()..];
        if preceded_ok {
            let rest = rest.trim_start();
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            return Some(&rest[..end]);
        }
        search = rest;
    }
}

/// One parsed ffmpeg status line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressUpdate {
    /// Output position in seconds
    pub position_secs: f64,
    /// Total duration if known
    pub duration_secs: Option<f64>,
    /// 0.0 to 100.0, present when the duration is known
    pub percent: Option<f64>,
    /// Encoding speed relative to realtime
    pub speed: Option<f64>,
    pub frame: Option<u64>,
    /// Remaining wall time estimate in seconds
    pub eta_secs: Option<f64>,
}

/// Parses a status line. Returns `None` for anything that is not a
/// progress report.
pub fn parse_progress_line(line: &str, duration_secs: Option<f64>) -> Option<ProgressUpdate> {
    let time = field(line, "time")?;
    let position_secs = parse_ffmpeg_time(time)?;
    let duration_secs = duration_secs.filter(|d| d.is_finite() && *d > 0.0);
    let percent = duration_secs.map(|d| (position_secs / d * 100.0).clamp(0.0, 100.0));
    let speed = field(line, "speed")
        .and_then(|s| s.trim_end_matches('x').parse::<f64>().ok())
        .filter(|s| s.is_finite() && *s > 0.0);
    let frame = field(line, "frame").and_then(|f| f.parse::<u64>().ok());
    let eta_secs = match (duration_secs, speed) {
        (Some(d), Some(s)) => Some(((d - position_secs) / s).max(0.0)),
        _ => None,
    };

    Some(ProgressUpdate {
        position_secs,
        duration_secs,
        percent,
        speed,
        frame,
        eta_secs,
    })
}

/// Stateful parser that only reports meaningful advances.
#[derive(Debug)]
pub struct ProgressTracker {
    duration_secs: Option<f64>,
    step_percent: f64,
    last_percent: f64,
}

impl ProgressTracker {
    pub fn new(duration_secs: Option<f64>) -> Self {
        Self {
            duration_secs,
            step_percent: 1.0,
            last_percent: -1.0,
        }
    }

    /// Minimum percent increase between reported updates.
    #[must_use]
    pub fn with_step(mut self, step_percent: f64) -> Self {
        self.step_percent = step_percent;
        self
    }

    /// Parses `line` and returns an update if it advanced by at least the
    /// configured step, or if the duration is unknown.
    pub fn observe(&mut self, line: &str) -> Option<ProgressUpdate> {
        let update = parse_progress_line(line, self.duration_secs)?;
        match update.percent {
            Some(percent) => {
                let finished = percent >= 100.0 && self.last_percent < 100.0;
                if percent >= self.last_percent + self.step_percent || finished {
                    self.last_percent = percent;
                    Some(update)
                } else {
                    None
                }
            }
            None => Some(update),
        }
    }
}
