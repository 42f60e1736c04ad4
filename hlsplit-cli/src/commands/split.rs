//! Implementation of the 'split' subcommand.
//!
//! Expands the inputs (directories are scanned for video files), turns the
//! flags into [`SplitOptions`], and runs every input through
//! [`split_batch`] under one [`JobContext`]. With `--timeout` a watcher
//! thread cancels that context once the deadline passes.

use crate::cli::SplitArgs;
use crate::commands::system_runner;
use crate::error::CliResult;
use crate::progress::TerminalProgress;

use hlsplit_core::config::SplitOptionsBuilder;
use hlsplit_core::encoding::BatchEntry;
use hlsplit_core::{
    CoreError, JobContext, LogSink, SplitOptions, SplitPhase, SplitSink, Splitter, ToolPaths,
    find_processable_files, format_duration, split_batch,
};

use anyhow::{Context, anyhow, bail};
use log::{info, warn};
use serde_json::json;

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

pub fn run_split(tools: ToolPaths, args: SplitArgs) -> CliResult<()> {
    let inputs = expand_inputs(&args.inputs)?;
    let options = split_options(&args);
    options.validate().context("Invalid split options")?;

    let splitter = Splitter::with_runner(system_runner(), tools);
    if args.dry_run {
        return run_dry(&splitter, &inputs, &args, &options);
    }

    let started = Instant::now();
    let ctx = JobContext::new();
    let watcher = match args.timeout {
        Some(secs) => Some(spawn_timeout_watcher(&ctx, Duration::from_secs(secs))?),
        None => None,
    };

    let progress = if args.json {
        TerminalProgress::hidden()
    } else {
        TerminalProgress::new()
    };
    let json = args.json;
    let batch = split_batch(
        &splitter,
        &ctx,
        &inputs,
        &args.output_dir,
        &options,
        usize::from(args.jobs),
        |input| -> Box<dyn SplitSink> {
            if json {
                Box::new(LogSink)
            } else {
                Box::new(progress.sink_for(input))
            }
        },
    );

    if let Some(handle) = watcher {
        // Release the watcher's hold so the context drains and it wakes up.
        ctx.done();
        let _ = handle.join();
    }
    let results = batch?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results_json(&results))?);
    } else {
        print_summary(&results, started.elapsed());
    }
    batch_outcome(&results)
}

/// Files to split, in command line order with directories expanded in place.
pub fn expand_inputs(inputs: &[PathBuf]) -> CliResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            match find_processable_files(input) {
                Ok(found) => {
                    info!("Found {} video file(s) in {}", found.len(), input.display());
                    files.extend(found);
                }
                Err(CoreError::NoFilesFound) => {
                    warn!("No video files found in {}", input.display());
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to scan {}", input.display()));
                }
            }
        } else if input.exists() {
            files.push(input.clone());
        } else {
            bail!("Input path '{}' does not exist", input.display());
        }
    }
    if files.is_empty() {
        return Err(CoreError::NoFilesFound.into());
    }
    Ok(files)
}

/// Builds the options for every split of this invocation.
pub fn split_options(args: &SplitArgs) -> SplitOptions {
    let mut builder = SplitOptionsBuilder::new()
        .quality_ceiling(args.quality.ceiling())
        .segment_duration_secs(args.segment_duration)
        .auto_output_dir(!args.no_auto_dir);
    if let Some(bitrate) = args.bitrate {
        builder = builder.bitrate_bps(bitrate);
    }
    if let Some(framerate) = args.framerate {
        builder = builder.framerate(framerate);
    }
    if let Some(encoder) = &args.video_codec {
        builder = builder.video_encoder(encoder.clone());
    }
    if let Some(encoder) = &args.audio_codec {
        builder = builder.audio_encoder(encoder.clone());
    }
    builder.build()
}

/// Holds one unit of `ctx` and cancels it if the context has not drained
/// within `timeout`. The caller must call `ctx.done()` after its own work.
fn spawn_timeout_watcher(ctx: &JobContext, timeout: Duration) -> CliResult<thread::JoinHandle<()>> {
    ctx.add(1);
    let watched = ctx.clone();
    let spawned = thread::Builder::new()
        .name("hlsplit-timeout".to_string())
        .spawn(move || {
            if !watched.wait_timeout(timeout) {
                warn!("Timeout of {}s reached, cancelling", timeout.as_secs());
                watched.cancel();
            }
        });
    spawned.map_err(|e| {
        ctx.done();
        anyhow!(e).context("Failed to start timeout watcher")
    })
}

fn run_dry(
    splitter: &Splitter,
    inputs: &[PathBuf],
    args: &SplitArgs,
    options: &SplitOptions,
) -> CliResult<()> {
    let mut entries = Vec::new();
    let mut failed = 0;
    for input in inputs {
        match splitter.dry_run(input, &args.output_dir, options) {
            Ok(dry) => {
                if !args.json {
                    println!("# {}", dry.input.display());
                    println!("{} {}", dry.program, dry.args.join(" "));
                }
                entries.push(json!({ "input": input, "dry_run": dry }));
            }
            Err(e) => {
                failed += 1;
                if !args.json {
                    eprintln!("{} {}: {e}", console::style("✗").red().bold(), input.display());
                }
                entries.push(json!({ "input": input, "error": e.to_string() }));
            }
        }
    }
    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    }
    if failed > 0 {
        bail!("{failed} of {} input(s) could not be planned", inputs.len());
    }
    Ok(())
}

fn results_json(results: &[BatchEntry]) -> serde_json::Value {
    let entries: Vec<_> = results
        .iter()
        .map(|(input, result)| match result {
            Ok(report) => json!({
                "input": input,
                "outcome": SplitPhase::Succeeded,
                "report": report,
            }),
            Err(e) => json!({
                "input": input,
                "outcome": e.outcome(),
                "phase": e.phase,
                "error": e.source.to_string(),
                "args": e.args,
            }),
        })
        .collect();
    serde_json::Value::Array(entries)
}

fn print_summary(results: &[BatchEntry], elapsed: Duration) {
    println!();
    for (input, result) in results {
        match result {
            Ok(report) => println!(
                "{} {} -> {} ({})",
                console::style("✓").green().bold(),
                input.display(),
                report.playlist.display(),
                format_duration(report.elapsed.as_secs_f64())
            ),
            Err(e) if e.is_cancelled() => println!(
                "{} {}: cancelled",
                console::style("✗").yellow().bold(),
                input.display()
            ),
            Err(e) => {
                println!(
                    "{} {}: {} while {}",
                    console::style("✗").red().bold(),
                    input.display(),
                    e.source,
                    e.phase
                );
                if let Some(args) = &e.args {
                    println!("    ffmpeg {}", args.join(" "));
                }
            }
        }
    }
    let succeeded = results.iter().filter(|(_, r)| r.is_ok()).count();
    println!(
        "{succeeded} of {} split(s) succeeded in {}",
        results.len(),
        format_duration(elapsed.as_secs_f64())
    );
}

/// Cancellation outranks failure so an interrupted batch exits with 130.
fn batch_outcome(results: &[BatchEntry]) -> CliResult<()> {
    let cancelled = results
        .iter()
        .filter(|(_, r)| r.as_ref().is_err_and(|e| e.is_cancelled()))
        .count();
    let failed = results.iter().filter(|(_, r)| r.is_err()).count() - cancelled;

    if cancelled > 0 {
        return Err(anyhow!(CoreError::Cancelled)
            .context(format!("{cancelled} of {} split(s) cancelled", results.len())));
    }
    if failed > 0 {
        bail!("{failed} of {} split(s) failed", results.len());
    }
    Ok(())
}
