// ============================================================================
// hlsplit-core/src/encoding/split.rs
// ============================================================================
//
// SPLITTER: End-to-End HLS Split of One Input
//
// The Splitter composes probing, planning, command assembly and streaming
// execution. A split moves through these phases:
//
//   Planning -> Encoding -> Succeeded | Failed | Cancelled
//
// Planning validates the input, probes it and decides the plan; nothing is
// written to disk and no encoder is started if it fails. Encoding creates the
// output directory, builds the ffmpeg argument vector and streams ffmpeg's
// output to the caller's SplitSink until the process exits or the JobContext
// is cancelled. Every terminal outcome carries the argument vector once one
// was built, so a failed run can be reproduced by hand.
//
// AI-ASSISTANT-INFO: Orchestrates probe, plan and ffmpeg execution for one input

// ---- Internal crate imports ----
use crate::config::{SplitOptions, ToolPaths};
use crate::context::JobContext;
use crate::encoding::command::{EncodeCommand, SegmentLayout};
use crate::error::{CoreError, CoreResult};
use crate::external::{FfprobeProber, MediaProber, ProcessRunner};
use crate::media::FormatDescriptor;
use crate::planner::{self, TranscodePlan};
use crate::progress_reporting::{ProgressTracker, ProgressUpdate};

// ---- External crate imports ----
use log::{debug, error, info};
use serde::Serialize;
use thiserror::Error;

// ---- Standard library imports ----
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Phase of a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitPhase {
    Planning,
    Encoding,
    Succeeded,
    Failed,
    Cancelled,
}

impl fmt::Display for SplitPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SplitPhase::Planning => "planning",
            SplitPhase::Encoding => "encoding",
            SplitPhase::Succeeded => "succeeded",
            SplitPhase::Failed => "failed",
            SplitPhase::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// Receives live updates from a split. All methods default to no-ops.
pub trait SplitSink {
    fn phase(&mut self, _input: &Path, _phase: SplitPhase) {}

    /// One non-blank line of ffmpeg output, in arrival order.
    fn line(&mut self, _line: &str) {}

    fn progress(&mut self, _update: &ProgressUpdate) {}
}

/// Sink that forwards everything to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl SplitSink for LogSink {
    fn phase(&mut self, input: &Path, phase: SplitPhase) {
        info!("{}: {}", input.display(), phase);
    }

    fn line(&mut self, line: &str) {
        debug!("ffmpeg: {line}");
    }

    fn progress(&mut self, update: &ProgressUpdate) {
        if let Some(percent) = update.percent {
            info!("progress: {percent:.1}%");
        }
    }
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl SplitSink for NullSink {}

/// Result of a successful split.
#[derive(Debug, Clone, Serialize)]
pub struct SplitReport {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub playlist: PathBuf,
    pub segment_template: PathBuf,
    pub plan: TranscodePlan,
    pub args: Vec<String>,
    pub lines_relayed: usize,
    #[serde(serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

/// A split that ended in failure or cancellation.
#[derive(Debug, Error)]
#[error("{} failed while {phase}: {source}", .input.display())]
pub struct SplitError {
    pub input: PathBuf,
    /// Phase the split was in when it stopped.
    pub phase: SplitPhase,
    /// ffmpeg arguments, if the split got far enough to build them.
    pub args: Option<Vec<String>>,
    #[source]
    pub source: CoreError,
}

impl SplitError {
    fn planning(input: &Path, source: CoreError) -> Self {
        Self {
            input: input.to_path_buf(),
            phase: SplitPhase::Planning,
            args: None,
            source,
        }
    }

    /// True when the split stopped because its context was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.source.is_cancelled()
    }

    /// Terminal phase for reporting.
    pub fn outcome(&self) -> SplitPhase {
        if self.is_cancelled() {
            SplitPhase::Cancelled
        } else {
            SplitPhase::Failed
        }
    }
}

/// Plan and command produced without running ffmpeg.
#[derive(Debug, Clone, Serialize)]
pub struct DryRun {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub plan: TranscodePlan,
    pub program: String,
    pub args: Vec<String>,
}

/// Splits media files into HLS playlists.
pub struct Splitter {
    runner: Arc<dyn ProcessRunner>,
    prober: Arc<dyn MediaProber>,
    tools: ToolPaths,
}

impl Splitter {
    pub fn new(
        runner: Arc<dyn ProcessRunner>,
        prober: Arc<dyn MediaProber>,
        tools: ToolPaths,
    ) -> Self {
        Self {
            runner,
            prober,
            tools,
        }
    }

    /// Splitter that probes with ffprobe through the same runner.
    pub fn with_runner(runner: Arc<dyn ProcessRunner>, tools: ToolPaths) -> Self {
        let prober = Arc::new(FfprobeProber::new(
            Arc::clone(&runner),
            tools.ffprobe_program(),
        ));
        Self::new(runner, prober, tools)
    }

    pub fn tools(&self) -> &ToolPaths {
        &self.tools
    }

    pub fn probe(&self, input: &Path) -> CoreResult<FormatDescriptor> {
        validate_input(input)?;
        self.prober.probe(input)
    }

    /// Plans a split and returns the ffmpeg invocation without running it or
    /// touching the filesystem. With `auto_output_dir` the reported directory
    /// is a placeholder under `output_dir`.
    pub fn dry_run(
        &self,
        input: &Path,
        output_dir: &Path,
        options: &SplitOptions,
    ) -> CoreResult<DryRun> {
        options.validate()?;
        let descriptor = self.probe(input)?;
        let plan = planner::plan(&descriptor, options.quality_ceiling, &options.overrides)?;
        let mut output_dir = absolute(output_dir)?;
        if options.auto_output_dir {
            output_dir.push("<uuid>");
        }
        let layout = layout_for(output_dir.clone(), options);
        let command = EncodeCommand::build(input, &plan, &layout);
        Ok(DryRun {
            input: input.to_path_buf(),
            output_dir,
            plan,
            program: self.tools.ffmpeg_program(),
            args: command.into_args(),
        })
    }

    /// Splits `input` into an HLS playlist under `output_dir`.
    ///
    /// # Panics
    ///
    /// Panics if `ctx` has already drained when the encoder is started. Use a fresh
    /// context per split, or register the work up front as [`split_batch`]
    /// does.
    ///
    /// [`split_batch`]: crate::encoding::split_batch
    pub fn split(
        &self,
        ctx: &JobContext,
        input: &Path,
        output_dir: &Path,
        options: &SplitOptions,
        sink: &mut dyn SplitSink,
    ) -> Result<SplitReport, SplitError> {
        let started = Instant::now();
        sink.phase(input, SplitPhase::Planning);

        let (descriptor, plan) = match self.plan_phase(ctx, input, options) {
            Ok(planned) => planned,
            Err(e) => {
                let err = SplitError::planning(input, e);
                report_outcome(sink, &err);
                return Err(err);
            }
        };

        sink.phase(input, SplitPhase::Encoding);
        let layout = match prepare_output_dir(output_dir, options.auto_output_dir) {
            Ok(dir) => layout_for(dir, options),
            Err(e) => {
                let err = SplitError {
                    input: input.to_path_buf(),
                    phase: SplitPhase::Encoding,
                    args: None,
                    source: e,
                };
                report_outcome(sink, &err);
                return Err(err);
            }
        };

        let command = EncodeCommand::build(input, &plan, &layout);
        info!(
            "Splitting {} into {}",
            input.display(),
            layout.output_dir.display()
        );

        let mut tracker = ProgressTracker::new(descriptor.duration_secs());
        let mut lines_relayed = 0usize;
        let result = self.runner.run_streaming(
            ctx,
            &self.tools.ffmpeg_program(),
            command.args(),
            &mut |line: &str| {
                lines_relayed += 1;
                sink.line(line);
                if let Some(update) = tracker.observe(line) {
                    sink.progress(&update);
                }
            },
        );

        match result {
            Ok(()) => {
                sink.phase(input, SplitPhase::Succeeded);
                let elapsed = started.elapsed();
                info!(
                    "Finished {} in {:.1}s",
                    input.display(),
                    elapsed.as_secs_f64()
                );
                Ok(SplitReport {
                    input: input.to_path_buf(),
                    playlist: layout.playlist_path(),
                    segment_template: layout.segment_path_template(),
                    output_dir: layout.output_dir,
                    plan,
                    args: command.into_args(),
                    lines_relayed,
                    elapsed,
                })
            }
            Err(e) => {
                let err = SplitError {
                    input: input.to_path_buf(),
                    phase: SplitPhase::Encoding,
                    args: Some(command.into_args()),
                    source: e,
                };
                report_outcome(sink, &err);
                Err(err)
            }
        }
    }

    fn plan_phase(
        &self,
        ctx: &JobContext,
        input: &Path,
        options: &SplitOptions,
    ) -> CoreResult<(FormatDescriptor, TranscodePlan)> {
        options.validate()?;
        validate_input(input)?;
        if ctx.is_cancelled() {
            return Err(CoreError::Cancelled);
        }
        let descriptor = self.prober.probe(input)?;
        let plan = planner::plan(&descriptor, options.quality_ceiling, &options.overrides)?;
        Ok((descriptor, plan))
    }
}

fn report_outcome(sink: &mut dyn SplitSink, err: &SplitError) {
    if err.is_cancelled() {
        info!("{} cancelled while {}", err.input.display(), err.phase);
    } else {
        error!("{err}");
    }
    sink.phase(&err.input, err.outcome());
}

/// Rejects inputs ffmpeg cannot be pointed at.
fn validate_input(input: &Path) -> CoreResult<()> {
    let text = input.to_string_lossy();
    if text.chars().any(char::is_whitespace) {
        return Err(CoreError::InvalidInput(format!(
            "file name cannot contain spaces: {text}"
        )));
    }
    if !input.is_file() {
        return Err(CoreError::InvalidInput(format!(
            "input file not found: {text}"
        )));
    }
    Ok(())
}

fn absolute(path: &Path) -> CoreResult<PathBuf> {
    std::path::absolute(path)
        .map_err(|e| CoreError::PathError(format!("cannot resolve {}: {e}", path.display())))
}

/// Resolves the output directory and creates it. With `auto` a fresh
/// `<output_dir>/<uuid>` directory is used.
fn prepare_output_dir(output_dir: &Path, auto: bool) -> CoreResult<PathBuf> {
    let mut dir = absolute(output_dir)?;
    if auto {
        dir.push(uuid::Uuid::new_v4().to_string());
    }
    std::fs::create_dir_all(&dir)?;
    debug!("Output directory: {}", dir.display());
    Ok(dir)
}

fn layout_for(output_dir: PathBuf, options: &SplitOptions) -> SegmentLayout {
    SegmentLayout {
        output_dir,
        playlist_name: options.playlist_name.clone(),
        segment_template: options.segment_template.clone(),
        segment_duration_secs: options.segment_duration_secs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn rejects_paths_with_spaces() {
        let err = validate_input(Path::new("/tmp/my movie.mp4")).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(ref m) if m.contains("spaces")));
    }

    #[test]
    fn rejects_missing_input() {
        let dir = tempdir().unwrap();
        let err = validate_input(&dir.path().join("absent.mp4")).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    #[test]
    fn auto_output_dirs_are_unique() {
        let dir = tempdir().unwrap();
        let a = prepare_output_dir(dir.path(), true).unwrap();
        let b = prepare_output_dir(dir.path(), true).unwrap();
        assert_ne!(a, b);
        assert!(a.is_dir() && b.is_dir());
        assert_eq!(a.parent(), Some(dir.path()));
    }

    #[test]
    fn fixed_output_dir_is_created() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("nested/out");
        let resolved = prepare_output_dir(&target, false).unwrap();
        assert_eq!(resolved, target);
        assert!(target.is_dir());
    }

    #[test]
    fn error_outcome_distinguishes_cancellation() {
        let cancelled = SplitError::planning(Path::new("a.mp4"), CoreError::Cancelled);
        assert_eq!(cancelled.outcome(), SplitPhase::Cancelled);
        let failed = SplitError::planning(Path::new("a.mp4"), CoreError::NoFilesFound);
        assert_eq!(failed.outcome(), SplitPhase::Failed);
        assert!(failed.args.is_none());
    }
}
