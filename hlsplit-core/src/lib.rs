//! Core library for splitting media into HLS playlists with ffmpeg.
//!
//! The crate probes inputs with ffprobe, decides whether each stream can be
//! copied or has to be re-encoded under an optional quality ceiling, and then
//! supervises ffmpeg while it writes a playlist and numbered MPEG-TS segments.
//! Every run is tied to a [`JobContext`] so callers can cancel it from another
//! thread.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use hlsplit_core::config::SplitOptionsBuilder;
//! use hlsplit_core::planner::QualityCeiling;
//! use std::path::Path;
//!
//! let options = SplitOptionsBuilder::new()
//!     .quality_ceiling(Some(QualityCeiling::P720))
//!     .segment_duration_secs(6)
//!     .build();
//!
//! match hlsplit_core::split(Path::new("/media/in.mp4"), Path::new("/srv/hls"), &options) {
//!     Ok(report) => println!("playlist at {}", report.playlist.display()),
//!     Err(e) if e.is_cancelled() => eprintln!("cancelled"),
//!     Err(e) => eprintln!("failed: {e}"),
//! }
//! ```

pub mod config;
pub mod context;
pub mod discovery;
pub mod encoding;
pub mod error;
pub mod external;
pub mod logging;
pub mod media;
pub mod planner;
pub mod progress_reporting;

// Re-exports for public API
pub use config::{SplitOptions, SplitOptionsBuilder, ToolPaths};
pub use context::{ContextState, JobContext};
pub use discovery::find_processable_files;
pub use encoding::{
    DryRun, EncodeCommand, LogSink, NullSink, SplitError, SplitPhase, SplitReport, SplitSink,
    Splitter, split_batch,
};
pub use error::{CoreError, CoreResult};
pub use external::{
    FfprobeProber, MediaProber, ProcessOutput, ProcessRunner, SystemProcessRunner,
    check_dependency,
};
pub use media::{FormatDescriptor, StreamDescriptor, StreamKind};
pub use planner::{CodecAction, PlanOverrides, QualityCeiling, TranscodePlan, plan};
pub use progress_reporting::{ProgressUpdate, format_duration, parse_ffmpeg_time};

use std::path::Path;
use std::sync::Arc;

/// Splits `input` with the system tools from the environment, a fresh
/// context and a logging sink.
pub fn split(
    input: &Path,
    output_dir: &Path,
    options: &SplitOptions,
) -> Result<SplitReport, SplitError> {
    let runner = Arc::new(SystemProcessRunner::new().with_reap_grace(config::reap_grace_from_env()));
    let splitter = Splitter::with_runner(runner, ToolPaths::from_env());
    splitter.split(&JobContext::new(), input, output_dir, options, &mut LogSink)
}
