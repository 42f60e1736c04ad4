// hlsplit-cli/src/lib.rs
//
// Library portion of the hlsplit CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod progress;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, ProbeArgs, QualityArg, SplitArgs};
pub use error::{CliResult, exit_code};

/// Runs the parsed command line.
pub fn run(cli: Cli) -> CliResult<()> {
    let tools = commands::tool_paths(cli.ffmpeg, cli.ffprobe);
    log::debug!("Using ffmpeg={} ffprobe={}", tools.ffmpeg.display(), tools.ffprobe.display());
    match cli.command {
        Commands::Split(args) => commands::split::run_split(tools, args),
        Commands::Probe(args) => commands::probe::run_probe(tools, args),
        Commands::Check => commands::check::run_check(&tools),
    }
}
