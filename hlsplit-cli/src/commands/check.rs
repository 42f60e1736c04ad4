//! Implementation of the 'check' subcommand.
//!
//! Starts ffmpeg and ffprobe with `-version` and reports what was found.

use crate::commands::system_runner;
use crate::error::CliResult;

use hlsplit_core::{ProcessRunner, ToolPaths, check_dependency};

use anyhow::bail;
use log::debug;

/// Checks every external tool and fails if any of them is unusable.
pub fn run_check(tools: &ToolPaths) -> CliResult<()> {
    let runner = system_runner();
    let missing = check_tools(runner.as_ref(), tools);
    if !missing.is_empty() {
        bail!("Missing dependencies: {}", missing.join(", "));
    }
    Ok(())
}

/// Prints one line per tool and returns the programs that failed.
pub fn check_tools(runner: &dyn ProcessRunner, tools: &ToolPaths) -> Vec<String> {
    let mut missing = Vec::new();
    for program in [tools.ffmpeg_program(), tools.ffprobe_program()] {
        match check_dependency(runner, &program) {
            Ok(banner) => {
                println!("{} {program}: {banner}", console::style("✓").green().bold());
            }
            Err(e) => {
                debug!("{program}: {e}");
                println!("{} {program}: not found", console::style("✗").red().bold());
                missing.push(program);
            }
        }
    }
    missing
}
