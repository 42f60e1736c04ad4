// ============================================================================
// hlsplit-cli/src/main.rs
// ============================================================================
//
// MAIN ENTRY POINT: hlsplit binary
//
// Parses the command line, installs the logging backend, runs the selected
// command and turns its result into an exit code: 0 on success, 1 on
// failure and 130 when the work was cancelled.
//
// AI-ASSISTANT-INFO: Binary entry point and exit code handling

// ---- Internal crate imports ----
use hlsplit_cli::error::{EXIT_FAILURE, is_cancellation};
use hlsplit_cli::logging::init_logging;
use hlsplit_cli::{Cli, exit_code, run};

// ---- External crate imports ----
use clap::Parser;

// ---- Standard library imports ----
use std::process;

fn main() {
    let cli = Cli::parse();

    match init_logging(cli.verbose, cli.log_dir.as_deref()) {
        Ok(Some(path)) => log::info!("Logging to {}", path.display()),
        Ok(None) => {}
        Err(e) => {
            eprintln!("{} {e:#}", console::style("Error:").red().bold());
            process::exit(EXIT_FAILURE);
        }
    }

    let result = run(cli);
    if let Err(e) = &result {
        if is_cancellation(e) {
            eprintln!("{} {e:#}", console::style("Cancelled:").yellow().bold());
        } else {
            log::debug!("Command failed: {e:?}");
            eprintln!("{} {e:#}", console::style("Error:").red().bold());
        }
    }
    process::exit(exit_code(&result));
}
