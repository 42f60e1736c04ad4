// hlsplit-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use hlsplit_core::QualityCeiling;
use hlsplit_core::config::DEFAULT_SEGMENT_DURATION_SECS;
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "hlsplit: adaptive HLS segmenting",
    long_about = "Splits media files into HLS playlists and MPEG-TS segments using ffmpeg, \
                  copying streams where possible and re-encoding under a quality ceiling."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// ffmpeg executable to run
    #[arg(long, global = true, value_name = "PATH", env = "HLSPLIT_FFMPEG")]
    pub ffmpeg: Option<PathBuf>,

    /// ffprobe executable to run
    #[arg(long, global = true, value_name = "PATH", env = "HLSPLIT_FFPROBE")]
    pub ffprobe: Option<PathBuf>,

    /// Also write a timestamped log file into this directory
    #[arg(long, global = true, value_name = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Increase console log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Splits media files into HLS playlists
    Split(SplitArgs),
    /// Prints what ffprobe reports about a media file
    Probe(ProbeArgs),
    /// Verifies that ffmpeg and ffprobe can be started
    Check,
}

/// Highest output tier, or `none` to keep the source resolution.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QualityArg {
    #[value(name = "480p")]
    P480,
    #[value(name = "720p")]
    P720,
    #[value(name = "1080p")]
    P1080,
    #[default]
    None,
}

impl QualityArg {
    pub fn ceiling(self) -> Option<QualityCeiling> {
        match self {
            QualityArg::P480 => Some(QualityCeiling::P480),
            QualityArg::P720 => Some(QualityCeiling::P720),
            QualityArg::P1080 => Some(QualityCeiling::P1080),
            QualityArg::None => None,
        }
    }
}

#[derive(Parser, Debug)]
pub struct SplitArgs {
    /// Input files, or directories whose video files are all split
    #[arg(required = true, value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    /// Directory that receives the playlists
    #[arg(short = 'o', long = "output", required = true, value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Quality ceiling for re-encoding
    #[arg(long, value_enum, default_value_t = QualityArg::None)]
    pub quality: QualityArg,

    /// Target segment length in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_SEGMENT_DURATION_SECS,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub segment_duration: u32,

    /// Write straight into OUTPUT_DIR instead of a fresh subdirectory per input
    #[arg(long)]
    pub no_auto_dir: bool,

    /// Encoder used when video has to be re-encoded
    #[arg(long, value_name = "ENCODER")]
    pub video_codec: Option<String>,

    /// Encoder used when audio has to be re-encoded
    #[arg(long, value_name = "ENCODER")]
    pub audio_codec: Option<String>,

    /// Upper bound for the video bitrate in bits per second
    #[arg(long, value_name = "BPS")]
    pub bitrate: Option<u64>,

    /// Upper bound for the output frame rate
    #[arg(long, value_name = "FPS")]
    pub framerate: Option<f64>,

    /// Number of inputs split concurrently
    #[arg(short, long, value_name = "N", default_value_t = 1,
          value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: u16,

    /// Cancel all running splits after this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Print the plan and ffmpeg command without running anything
    #[arg(long)]
    pub dry_run: bool,

    /// Print results as JSON instead of progress bars
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct ProbeArgs {
    /// Media file to inspect
    #[arg(required = true, value_name = "INPUT")]
    pub input: PathBuf,

    /// Print the full probe result as JSON
    #[arg(long)]
    pub json: bool,
}
