//! Splitter orchestration against scripted runners and probers.
#![cfg(unix)]

mod common;

use common::*;
use hlsplit_core::config::SplitOptionsBuilder;
use hlsplit_core::planner::{CodecAction, QualityCeiling};
use hlsplit_core::{CoreError, JobContext, SplitPhase, Splitter, ToolPaths};

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tempfile::tempdir;

fn tools() -> ToolPaths {
    ToolPaths {
        ffmpeg: PathBuf::from("/opt/ffmpeg/bin/ffmpeg"),
        ffprobe: PathBuf::from("/opt/ffmpeg/bin/ffprobe"),
    }
}

fn tall_h264() -> hlsplit_core::FormatDescriptor {
    descriptor(
        vec![
            video_stream("h264", 1080, Some("3000000"), "30000/1001"),
            audio_stream("aac"),
        ],
        Some("100.0"),
    )
}

#[test]
fn successful_split_reports_plan_and_args() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = touch(dir.path(), "clip.mp4");
    let out = dir.path().join("hls");

    let runner = Arc::new(ScriptedRunner::new(
        &[
            "Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'clip.mp4':",
            "frame=  100 fps=50 time=00:00:50.00 bitrate=900.0kbits/s speed=2.0x",
            "frame=  200 fps=50 time=00:01:40.00 bitrate=900.0kbits/s speed=2.0x",
        ],
        Ending::Exit(0),
    ));
    let prober = Arc::new(StaticProber::new(tall_h264()));
    let splitter = Splitter::new(runner.clone(), prober.clone(), tools());
    let options = SplitOptionsBuilder::new()
        .quality_ceiling(Some(QualityCeiling::P720))
        .auto_output_dir(false)
        .segment_duration_secs(6)
        .build();

    let mut sink = RecordingSink::default();
    let ctx = JobContext::new();
    let report = splitter.split(&ctx, &input, &out, &options, &mut sink)?;

    assert_eq!(
        sink.phases(),
        [SplitPhase::Planning, SplitPhase::Encoding, SplitPhase::Succeeded]
    );
    assert_eq!(sink.lines().len(), 3);
    assert_eq!(report.lines_relayed, 3);
    assert_eq!(sink.progress.lock().unwrap().len(), 2);

    assert_eq!(report.output_dir, out);
    assert!(out.is_dir());
    assert_eq!(report.playlist, out.join("media.m3u8"));
    assert_eq!(report.plan.video(), &CodecAction::Encode("libx264".to_string()));
    assert_eq!(report.plan.scale_height(), Some(720));

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].program, "/opt/ffmpeg/bin/ffmpeg");
    assert_eq!(calls[0].args, report.args);
    assert_eq!(report.args[2], input.to_string_lossy());
    assert_eq!(report.args.last().unwrap(), &out.join("media.m3u8").to_string_lossy());
    assert!(report.args.windows(2).any(|w| w[0] == "-hls_time" && w[1] == "6"));
    assert_eq!(prober.probe_count(), 1);
    assert_eq!(ctx.outstanding(), 0);
    Ok(())
}

#[test]
fn auto_output_dir_is_fresh_per_split() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = touch(dir.path(), "clip.mkv");
    let runner = Arc::new(ScriptedRunner::new(&[], Ending::Exit(0)));
    let prober = Arc::new(StaticProber::new(tall_h264()));
    let splitter = Splitter::new(runner, prober, tools());
    let options = SplitOptionsBuilder::new().build();

    let first = splitter.split(&JobContext::new(), &input, dir.path(), &options, &mut RecordingSink::default())?;
    let second = splitter.split(&JobContext::new(), &input, dir.path(), &options, &mut RecordingSink::default())?;

    assert_ne!(first.output_dir, second.output_dir);
    assert_eq!(first.output_dir.parent(), Some(dir.path()));
    assert!(first.plan.is_remux_only());
    Ok(())
}

#[test]
fn planning_failure_never_starts_encoder() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = touch(dir.path(), "silent.mp4");
    let runner = Arc::new(ScriptedRunner::new(&[], Ending::Exit(0)));
    let video_only = descriptor(vec![video_stream("h264", 720, None, "25/1")], None);
    let splitter = Splitter::new(runner.clone(), Arc::new(StaticProber::new(video_only)), tools());

    let mut sink = RecordingSink::default();
    let err = splitter
        .split(&JobContext::new(), &input, &dir.path().join("out"), &SplitOptionsBuilder::new().build(), &mut sink)
        .unwrap_err();

    assert_eq!(err.phase, SplitPhase::Planning);
    assert!(matches!(err.source, CoreError::NotTranscodable(_)));
    assert!(err.args.is_none());
    assert!(!err.is_cancelled());
    assert!(runner.calls().is_empty());
    assert!(!dir.path().join("out").exists());
    assert_eq!(sink.phases(), [SplitPhase::Planning, SplitPhase::Failed]);
    Ok(())
}

#[test]
fn path_with_spaces_is_rejected_before_probing() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = touch(dir.path(), "my clip.mp4");
    let prober = Arc::new(StaticProber::new(tall_h264()));
    let splitter = Splitter::new(
        Arc::new(ScriptedRunner::new(&[], Ending::Exit(0))),
        prober.clone(),
        tools(),
    );

    let err = splitter
        .split(&JobContext::new(), &input, dir.path(), &SplitOptionsBuilder::new().build(), &mut RecordingSink::default())
        .unwrap_err();
    assert!(matches!(err.source, CoreError::InvalidInput(_)));
    assert_eq!(prober.probe_count(), 0);
    Ok(())
}

#[test]
fn encoder_failure_carries_args() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = touch(dir.path(), "clip.mp4");
    let runner = Arc::new(ScriptedRunner::new(&["Conversion failed!"], Ending::Exit(1)));
    let splitter = Splitter::new(runner, Arc::new(StaticProber::new(tall_h264())), tools());

    let mut sink = RecordingSink::default();
    let err = splitter
        .split(&JobContext::new(), &input, dir.path(), &SplitOptionsBuilder::new().build(), &mut sink)
        .unwrap_err();

    assert_eq!(err.phase, SplitPhase::Encoding);
    assert_eq!(err.outcome(), SplitPhase::Failed);
    assert!(matches!(err.source, CoreError::CommandFailed { .. }));
    let args = err.args.expect("args recorded");
    assert_eq!(args[0], "-y");
    assert_eq!(sink.lines(), ["Conversion failed!"]);
    assert_eq!(sink.phases().last(), Some(&SplitPhase::Failed));
    Ok(())
}

#[test]
fn cancellation_is_not_a_failure() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = touch(dir.path(), "clip.mp4");
    let runner = Arc::new(ScriptedRunner::new(&["frame=1 time=00:00:01.00"], Ending::AwaitCancel));
    let splitter = Splitter::new(runner, Arc::new(StaticProber::new(tall_h264())), tools());

    let ctx = JobContext::new();
    let canceller = ctx.clone();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(200));
        canceller.cancel();
    });

    let mut sink = RecordingSink::default();
    let err = splitter
        .split(&ctx, &input, dir.path(), &SplitOptionsBuilder::new().build(), &mut sink)
        .unwrap_err();
    handle.join().unwrap();

    assert!(err.is_cancelled());
    assert_eq!(err.outcome(), SplitPhase::Cancelled);
    assert!(err.args.is_some());
    assert_eq!(sink.phases().last(), Some(&SplitPhase::Cancelled));
    Ok(())
}

#[test]
fn cancelled_context_stops_in_planning() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = touch(dir.path(), "clip.mp4");
    let prober = Arc::new(StaticProber::new(tall_h264()));
    let runner = Arc::new(ScriptedRunner::new(&[], Ending::Exit(0)));
    let splitter = Splitter::new(runner.clone(), prober.clone(), tools());

    let ctx = JobContext::new();
    ctx.cancel();
    let err = splitter
        .split(&ctx, &input, dir.path(), &SplitOptionsBuilder::new().build(), &mut RecordingSink::default())
        .unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(err.phase, SplitPhase::Planning);
    assert_eq!(prober.probe_count(), 0);
    assert!(runner.calls().is_empty());
    Ok(())
}

#[test]
fn dry_run_builds_args_without_side_effects() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input = touch(dir.path(), "clip.mp4");
    let runner = Arc::new(ScriptedRunner::new(&[], Ending::Exit(0)));
    let splitter = Splitter::new(runner.clone(), Arc::new(StaticProber::new(tall_h264())), tools());
    let out = dir.path().join("never-created");

    let options = SplitOptionsBuilder::new()
        .quality_ceiling(Some(QualityCeiling::P480))
        .build();
    let dry = splitter.dry_run(&input, &out, &options)?;

    assert!(!out.exists());
    assert!(runner.calls().is_empty());
    assert_eq!(dry.program, "/opt/ffmpeg/bin/ffmpeg");
    assert_eq!(dry.plan.scale_height(), Some(480));
    assert!(dry.args.iter().any(|a| a == "500K"));
    assert!(dry.output_dir.starts_with(&out));
    Ok(())
}
