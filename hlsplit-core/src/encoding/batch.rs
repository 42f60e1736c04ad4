//! Splitting several inputs under one shared context.
//!
//! Inputs run on a dedicated rayon pool so the caller controls how many
//! ffmpeg processes are alive at once. All splits share the caller's
//! [`JobContext`]: one `cancel()` stops every running and pending split, and
//! the context drains once the whole batch has finished.

use log::{info, warn};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::config::SplitOptions;
use crate::context::JobContext;
use crate::encoding::split::{SplitError, SplitReport, SplitSink, Splitter};
use crate::error::{CoreError, CoreResult};

/// Outcome of one input in a batch.
pub type BatchEntry = (PathBuf, Result<SplitReport, SplitError>);

/// Runs [`Splitter::split`] for each input with at most `jobs` in flight.
///
/// `make_sink` is called once per input, on the worker thread that runs it.
/// Results are returned in input order.
///
/// # Panics
///
/// Panics if `ctx` already drained.
pub fn split_batch<F>(
    splitter: &Splitter,
    ctx: &JobContext,
    inputs: &[PathBuf],
    output_dir: &Path,
    options: &SplitOptions,
    jobs: usize,
    make_sink: F,
) -> CoreResult<Vec<BatchEntry>>
where
    F: Fn(&Path) -> Box<dyn SplitSink> + Sync,
{
    if inputs.is_empty() {
        return Ok(Vec::new());
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .thread_name(|i| format!("hlsplit-worker-{i}"))
        .build()
        .map_err(|e| CoreError::Config(format!("failed to build worker pool: {e}")))?;

    info!(
        "Splitting {} input(s) with {} concurrent job(s)",
        inputs.len(),
        jobs.max(1)
    );

    ctx.add(inputs.len());
    let results: Vec<BatchEntry> = pool.install(|| {
        inputs
            .par_iter()
            .map(|input| {
                let mut sink = make_sink(input);
                let result = splitter.split(ctx, input, output_dir, options, sink.as_mut());
                ctx.done();
                (input.clone(), result)
            })
            .collect()
    });

    let failed = results.iter().filter(|(_, r)| r.is_err()).count();
    if failed > 0 {
        warn!("{failed} of {} split(s) did not succeed", results.len());
    }
    Ok(results)
}
