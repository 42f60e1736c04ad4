// ============================================================================
// hlsplit-cli/src/progress.rs
// ============================================================================
//
// PROGRESS REPORTING: Terminal progress for running splits
//
// Each input gets one indicatif bar inside a shared MultiProgress. The bar
// starts as a spinner while the input is probed and planned, switches to a
// percentage bar once ffmpeg is running, and is finished with a green check
// or a red cross when the split ends.
//
// KEY COMPONENTS:
// - TerminalProgress: Owns the MultiProgress and hands out sinks
// - BarSink: SplitSink that drives one bar
//
// AI-ASSISTANT-INFO: indicatif-based SplitSink for the CLI

// ---- Internal crate imports ----
use hlsplit_core::{ProgressUpdate, SplitPhase, SplitSink, format_duration};

// ---- External crate imports ----
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::debug;

// ---- Standard library imports ----
use std::path::Path;
use std::time::Duration;

const SPINNER_TEMPLATE: &str = "  {spinner} {prefix}: {msg}";
const BAR_TEMPLATE: &str = "  {prefix}: {percent:>3}% [{bar:30}] ({elapsed}) {msg}";

// ============================================================================
// TERMINAL PROGRESS
// ============================================================================

/// Shared display for all splits of one invocation.
#[derive(Clone)]
pub struct TerminalProgress {
    multi: MultiProgress,
}

impl TerminalProgress {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
        }
    }

    /// Display that draws nothing, for JSON output and tests.
    pub fn hidden() -> Self {
        Self {
            multi: MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
        }
    }

    /// Creates the sink for one input.
    pub fn sink_for(&self, input: &Path) -> BarSink {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| input.display().to_string());
        let bar = self.multi.add(ProgressBar::new(100));
        bar.set_prefix(name);
        BarSink { bar, max_percent: 0 }
    }
}

impl Default for TerminalProgress {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// BAR SINK
// ============================================================================

/// Drives a single progress bar from split events.
pub struct BarSink {
    bar: ProgressBar,
    max_percent: u64,
}

impl BarSink {
    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template(SPINNER_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##.")
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl SplitSink for BarSink {
    fn phase(&mut self, _input: &Path, phase: SplitPhase) {
        match phase {
            SplitPhase::Planning => {
                self.bar.set_style(Self::spinner_style());
                self.bar.set_message("probing");
                self.bar.enable_steady_tick(Duration::from_millis(100));
            }
            SplitPhase::Encoding => {
                self.bar.set_style(Self::bar_style());
                self.bar.set_message("");
            }
            SplitPhase::Succeeded => {
                self.bar.set_position(100);
                self.bar.finish_with_message(format!(
                    "{} done",
                    console::style("✓").green().bold()
                ));
            }
            SplitPhase::Failed => {
                self.bar.abandon_with_message(format!(
                    "{} failed",
                    console::style("✗").red().bold()
                ));
            }
            SplitPhase::Cancelled => {
                self.bar.abandon_with_message(format!(
                    "{} cancelled",
                    console::style("✗").yellow().bold()
                ));
            }
        }
    }

    fn line(&mut self, line: &str) {
        debug!("ffmpeg: {line}");
    }

    fn progress(&mut self, update: &ProgressUpdate) {
        let Some(percent) = update.percent else {
            self.bar
                .set_message(format!("at {}", format_duration(update.position_secs)));
            return;
        };
        let pos = percent.clamp(0.0, 100.0) as u64;
        // ffmpeg occasionally reports a timestamp behind the previous one
        if pos >= self.max_percent {
            self.max_percent = pos;
            self.bar.set_position(pos);
        }
        if let Some(speed) = update.speed {
            let eta = update
                .eta_secs
                .map(|s| format!(", eta {}", format_duration(s)))
                .unwrap_or_default();
            self.bar.set_message(format!("{speed:.1}x{eta}"));
        }
    }
}
