use clap::Parser;
use hlsplit_cli::{Cli, Commands, QualityArg};
use std::error::Error;

#[test]
fn split_defaults() {
    let cli = Cli::parse_from(["hlsplit", "split", "a.mp4", "b.mkv", "-o", "/srv/hls"]);
    let Commands::Split(args) = cli.command else {
        panic!("expected split");
    };
    assert_eq!(args.inputs.len(), 2);
    assert_eq!(args.quality, QualityArg::None);
    assert_eq!(args.segment_duration, 10);
    assert_eq!(args.jobs, 1);
    assert!(!args.no_auto_dir);
    assert!(!args.dry_run);
    assert!(args.timeout.is_none());
}

#[test]
fn split_requires_output() {
    assert!(Cli::try_parse_from(["hlsplit", "split", "a.mp4"]).is_err());
}

#[test]
fn unknown_quality_is_rejected() {
    let result = Cli::try_parse_from(["hlsplit", "split", "a.mp4", "-o", "out", "--quality", "4k"]);
    assert!(result.is_err());
}

#[test]
fn zero_segment_duration_is_rejected() {
    let result = Cli::try_parse_from([
        "hlsplit", "split", "a.mp4", "-o", "out", "--segment-duration", "0",
    ]);
    assert!(result.is_err());
}

#[test]
fn global_flags_follow_the_subcommand() {
    let cli = Cli::parse_from([
        "hlsplit", "check", "--ffmpeg", "/opt/ff/ffmpeg", "--ffprobe", "/opt/ff/ffprobe", "-vv",
    ]);
    assert!(matches!(cli.command, Commands::Check));
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.ffmpeg.as_deref(), Some(std::path::Path::new("/opt/ff/ffmpeg")));
}

#[test]
fn probe_json_flag() -> Result<(), Box<dyn Error>> {
    let cli = Cli::try_parse_from(["hlsplit", "probe", "talk.mp4", "--json"])?;
    match cli.command {
        Commands::Probe(args) => assert!(args.json),
        other => panic!("expected probe, got {other:?}"),
    }
    Ok(())
}

/// Runs the real binary against shell scripts standing in for ffmpeg/ffprobe.
#[cfg(unix)]
mod binary {
    use std::error::Error;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use std::process::{Command, Output};
    use std::time::{Duration, Instant};
    use tempfile::{TempDir, tempdir};

    const PROBE_JSON: &str = r#"{
  "streams": [
    {"index": 0, "codec_name": "h264", "codec_type": "video", "width": 1920, "height": 1080,
     "r_frame_rate": "30000/1001", "bit_rate": "3000000"},
    {"index": 1, "codec_name": "aac", "codec_type": "audio", "channels": 2}
  ],
  "format": {"filename": "clip.mp4", "format_name": "mov,mp4", "duration": "10.000000"}
}"#;

    struct Fixture {
        dir: TempDir,
        ffmpeg: PathBuf,
        ffprobe: PathBuf,
        input: PathBuf,
    }

    fn script(dir: &Path, name: &str, body: &str) -> Result<PathBuf, Box<dyn Error>> {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n"))?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
        Ok(path)
    }

    fn fixture(ffmpeg_body: &str) -> Result<Fixture, Box<dyn Error>> {
        let dir = tempdir()?;
        let ffprobe = script(dir.path(), "ffprobe", &format!("cat <<'JSON'\n{PROBE_JSON}\nJSON"))?;
        let ffmpeg = script(dir.path(), "ffmpeg", ffmpeg_body)?;
        let input = dir.path().join("clip.mp4");
        fs::write(&input, b"not really video")?;
        Ok(Fixture {
            dir,
            ffmpeg,
            ffprobe,
            input,
        })
    }

    fn hlsplit(fx: &Fixture, args: &[&str]) -> Result<Output, Box<dyn Error>> {
        let output = Command::new(env!("CARGO_BIN_EXE_hlsplit"))
            .args(args)
            .arg("--ffmpeg")
            .arg(&fx.ffmpeg)
            .arg("--ffprobe")
            .arg(&fx.ffprobe)
            .env_remove("HLSPLIT_FFMPEG")
            .env_remove("HLSPLIT_FFPROBE")
            .env_remove("RUST_LOG")
            .output()?;
        Ok(output)
    }

    const WRITING_FFMPEG: &str = r##"echo "frame=  150 fps=75 time=00:00:05.00 bitrate=900.0kbits/s speed=2.0x" 1>&2
for last; do :; done
echo "#EXTM3U" > "$last""##;

    #[test]
    fn split_writes_playlist_and_reports_json() -> Result<(), Box<dyn Error>> {
        let fx = fixture(WRITING_FFMPEG)?;
        let out = fx.dir.path().join("hls");
        let input = fx.input.to_string_lossy().into_owned();
        let out_arg = out.to_string_lossy().into_owned();
        let output = hlsplit(
            &fx,
            &["split", &input, "-o", &out_arg, "--quality", "720p", "--no-auto-dir", "--json"],
        )?;

        assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));
        assert!(out.join("media.m3u8").is_file());

        let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
        assert_eq!(value[0]["outcome"], "succeeded");
        let args: Vec<String> = serde_json::from_value(value[0]["report"]["args"].clone())?;
        assert!(args.windows(2).any(|w| w[0] == "-vf" && w[1] == "scale=-2:720"));
        assert!(args.windows(2).any(|w| w[0] == "-b:v" && w[1] == "1000K"));
        assert_eq!(args.last().map(String::as_str), Some(out.join("media.m3u8").to_str().unwrap_or_default()));
        Ok(())
    }

    #[test]
    fn encoder_failure_exits_with_one() -> Result<(), Box<dyn Error>> {
        let fx = fixture("echo 'Conversion failed!' 1>&2\nexit 1")?;
        let input = fx.input.to_string_lossy().into_owned();
        let out = fx.dir.path().join("hls").to_string_lossy().into_owned();
        let output = hlsplit(&fx, &["split", &input, "-o", &out])?;
        assert_eq!(output.status.code(), Some(1));
        assert!(String::from_utf8_lossy(&output.stderr).contains("1 of 1 split(s) failed"));
        Ok(())
    }

    #[test]
    fn timeout_cancels_and_exits_with_130() -> Result<(), Box<dyn Error>> {
        let fx = fixture("exec sleep 30")?;
        let input = fx.input.to_string_lossy().into_owned();
        let out = fx.dir.path().join("hls").to_string_lossy().into_owned();

        let started = Instant::now();
        let output = hlsplit(&fx, &["split", &input, "-o", &out, "--timeout", "1", "--json"])?;
        assert_eq!(output.status.code(), Some(130));
        assert!(started.elapsed() < Duration::from_secs(20));

        let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
        assert_eq!(value[0]["outcome"], "cancelled");
        assert!(value[0]["args"].is_array());
        Ok(())
    }

    #[test]
    fn dry_run_touches_nothing() -> Result<(), Box<dyn Error>> {
        let fx = fixture("touch ran-anyway\nexit 0")?;
        let input = fx.input.to_string_lossy().into_owned();
        let out = fx.dir.path().join("never");
        let out_arg = out.to_string_lossy().into_owned();
        let output = hlsplit(&fx, &["split", &input, "-o", &out_arg, "--dry-run"])?;

        assert_eq!(output.status.code(), Some(0));
        assert!(!out.exists());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("-hls_time 10"));
        assert!(stdout.contains("-c:v copy"));
        Ok(())
    }

    #[test]
    fn check_reports_missing_tools() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let output = Command::new(env!("CARGO_BIN_EXE_hlsplit"))
            .arg("check")
            .arg("--ffmpeg")
            .arg(dir.path().join("no-ffmpeg"))
            .arg("--ffprobe")
            .arg(dir.path().join("no-ffprobe"))
            .output()?;
        assert_eq!(output.status.code(), Some(1));
        assert!(String::from_utf8_lossy(&output.stderr).contains("Missing dependencies"));
        Ok(())
    }

    #[test]
    fn check_accepts_working_tools() -> Result<(), Box<dyn Error>> {
        let fx = fixture("echo 'ffmpeg version 6.1 Copyright (c) 2000-2023'")?;
        // the fake ffprobe prints JSON for -version, which still starts fine
        let output = hlsplit(&fx, &["check"])?;
        assert_eq!(output.status.code(), Some(0));
        assert!(String::from_utf8_lossy(&output.stdout).contains("ffmpeg version 6.1"));
        Ok(())
    }
}
