//! Implementation of the 'probe' subcommand.
//!
//! Prints the streams ffprobe reports for one file together with the plan
//! each quality ceiling would produce for it.

use crate::cli::ProbeArgs;
use crate::commands::system_runner;
use crate::error::CliResult;

use hlsplit_core::{
    FormatDescriptor, PlanOverrides, QualityCeiling, Splitter, StreamDescriptor, ToolPaths,
    format_duration, plan,
};

use anyhow::Context;
use std::fmt::Write as _;

pub fn run_probe(tools: ToolPaths, args: ProbeArgs) -> CliResult<()> {
    let splitter = Splitter::with_runner(system_runner(), tools);
    let descriptor = splitter
        .probe(&args.input)
        .with_context(|| format!("Failed to probe {}", args.input.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&descriptor)?);
    } else {
        print!("{}", render_probe(&descriptor));
    }
    Ok(())
}

/// Human readable summary of a probe result.
pub fn render_probe(descriptor: &FormatDescriptor) -> String {
    let mut out = String::new();
    let format = &descriptor.format;
    let _ = writeln!(out, "{}", console::style(&format.filename).bold());
    let _ = writeln!(
        out,
        "  Container: {}",
        format.format_long_name.as_deref().or(format.format_name.as_deref()).unwrap_or("unknown")
    );
    if let Some(duration) = descriptor.duration_secs() {
        let _ = writeln!(out, "  Duration:  {}", format_duration(duration));
    }
    if let Some(size) = descriptor.size_bytes() {
        let _ = writeln!(out, "  Size:      {size} bytes");
    }

    let _ = writeln!(out, "  Streams:");
    for stream in &descriptor.streams {
        let _ = writeln!(out, "    {}", describe_stream(stream));
    }

    let _ = writeln!(out, "  Plans:");
    let overrides = PlanOverrides::default();
    let ceilings = std::iter::once(None).chain(QualityCeiling::ALL.iter().copied().map(Some));
    for ceiling in ceilings {
        let label = ceiling.map_or("none", QualityCeiling::as_str);
        let line = match plan(descriptor, ceiling, &overrides) {
            Ok(p) => {
                let mut line = format!(
                    "video={} audio={}",
                    p.video().as_ffmpeg_arg(),
                    p.audio().as_ffmpeg_arg()
                );
                if let Some(h) = p.scale_height() {
                    let _ = write!(line, " scale={h}p");
                }
                if let Some(b) = p.bitrate_bps() {
                    let _ = write!(line, " bitrate={}K", b / 1024);
                }
                if let Some(r) = p.framerate() {
                    let _ = write!(line, " framerate={r:.2}");
                }
                line
            }
            Err(e) => format!("not splittable: {e}"),
        };
        let _ = writeln!(out, "    {label:>5}: {line}");
    }
    out
}

fn describe_stream(stream: &StreamDescriptor) -> String {
    let mut line = format!("#{} {:?} {}", stream.index, stream.kind, stream.codec());
    if let (Some(w), Some(h)) = (stream.width, stream.height) {
        let _ = write!(line, " {w}x{h}");
    }
    if stream.is_video() {
        let _ = write!(line, " {:.3}fps", stream.frame_rate().as_f64());
    }
    if let Some(bps) = stream.bit_rate_bps() {
        let _ = write!(line, " {}kb/s", bps / 1000);
    }
    if let Some(channels) = stream.channels {
        let _ = write!(line, " {channels}ch");
    }
    if let Some(lang) = stream.language() {
        let _ = write!(line, " [{lang}]");
    }
    line
}
