//! HLS splitting: command assembly, single-input orchestration and batches.

pub mod batch;
pub mod command;
pub mod split;

pub use batch::{BatchEntry, split_batch};
pub use command::{EncodeCommand, SegmentLayout};
pub use split::{DryRun, LogSink, NullSink, SplitError, SplitPhase, SplitReport, SplitSink, Splitter};
