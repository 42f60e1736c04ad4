// Shared test doubles for hlsplit-core integration tests.
#![allow(dead_code)]

use hlsplit_core::external::{MediaProber, ProcessOutput, ProcessRunner};
use hlsplit_core::media::{ContainerInfo, FormatDescriptor, StreamDescriptor, StreamKind};
use hlsplit_core::progress_reporting::ProgressUpdate;
use hlsplit_core::{CoreError, CoreResult, JobContext, SplitPhase, SplitSink};

use std::fs::File;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::{Arc, Mutex};

/// How a scripted streaming run ends.
#[derive(Debug, Clone)]
pub enum Ending {
    Exit(i32),
    /// Block until the context is cancelled, then report cancellation.
    AwaitCancel,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub program: String,
    pub args: Vec<String>,
}

/// Runner that replays canned output instead of starting processes.
pub struct ScriptedRunner {
    lines: Vec<String>,
    ending: Ending,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedRunner {
    pub fn new(lines: &[&str], ending: Ending) -> Self {
        Self {
            lines: lines.iter().map(|l| l.to_string()).collect(),
            ending,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, program: &str, args: &[String]) {
        self.calls.lock().unwrap().push(RecordedCall {
            program: program.to_string(),
            args: args.to_vec(),
        });
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run_captured(&self, program: &str, args: &[String]) -> CoreResult<ProcessOutput> {
        self.record(program, args);
        Ok(ProcessOutput {
            stdout: self.lines.join("\n"),
            stderr: String::new(),
        })
    }

    fn run_streaming(
        &self,
        ctx: &JobContext,
        program: &str,
        args: &[String],
        sink: &mut dyn FnMut(&str),
    ) -> CoreResult<()> {
        self.record(program, args);
        ctx.add(1);
        let result = (|| {
            if ctx.is_cancelled() {
                return Err(CoreError::Cancelled);
            }
            for line in &self.lines {
                sink(line);
            }
            match self.ending {
                Ending::Exit(0) => Ok(()),
                Ending::Exit(code) => Err(CoreError::CommandFailed {
                    command: program.to_string(),
                    status: ExitStatus::from_raw(code << 8),
                    output: self.lines.join("\n"),
                }),
                Ending::AwaitCancel => {
                    let _ = ctx.cancelled().recv();
                    Err(CoreError::Cancelled)
                }
            }
        })();
        ctx.done();
        result
    }
}

/// Prober returning a fixed descriptor with the probed path as file name.
pub struct StaticProber {
    descriptor: FormatDescriptor,
    probes: Mutex<usize>,
}

impl StaticProber {
    pub fn new(descriptor: FormatDescriptor) -> Self {
        Self {
            descriptor,
            probes: Mutex::new(0),
        }
    }

    pub fn probe_count(&self) -> usize {
        *self.probes.lock().unwrap()
    }
}

impl MediaProber for StaticProber {
    fn probe(&self, input: &Path) -> CoreResult<FormatDescriptor> {
        *self.probes.lock().unwrap() += 1;
        let mut descriptor = self.descriptor.clone();
        descriptor.format.filename = input.to_string_lossy().into_owned();
        Ok(descriptor)
    }
}

/// Sink recording everything it receives.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub phases: Arc<Mutex<Vec<SplitPhase>>>,
    pub lines: Arc<Mutex<Vec<String>>>,
    pub progress: Arc<Mutex<Vec<ProgressUpdate>>>,
}

impl RecordingSink {
    pub fn phases(&self) -> Vec<SplitPhase> {
        self.phases.lock().unwrap().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl SplitSink for RecordingSink {
    fn phase(&mut self, _input: &Path, phase: SplitPhase) {
        self.phases.lock().unwrap().push(phase);
    }

    fn line(&mut self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }

    fn progress(&mut self, update: &ProgressUpdate) {
        self.progress.lock().unwrap().push(update.clone());
    }
}

pub fn video_stream(codec: &str, height: u32, bit_rate: Option<&str>, rate: &str) -> StreamDescriptor {
    StreamDescriptor {
        index: 0,
        kind: StreamKind::Video,
        codec_name: Some(codec.to_string()),
        width: Some(height * 16 / 9),
        height: Some(height),
        bit_rate: bit_rate.map(str::to_string),
        r_frame_rate: Some(rate.to_string()),
        ..StreamDescriptor::default()
    }
}

pub fn audio_stream(codec: &str) -> StreamDescriptor {
    StreamDescriptor {
        index: 1,
        kind: StreamKind::Audio,
        codec_name: Some(codec.to_string()),
        ..StreamDescriptor::default()
    }
}

pub fn descriptor(streams: Vec<StreamDescriptor>, duration: Option<&str>) -> FormatDescriptor {
    FormatDescriptor {
        streams,
        format: ContainerInfo {
            duration: duration.map(str::to_string),
            ..ContainerInfo::default()
        },
    }
}

/// Creates an empty placeholder input file.
pub fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    File::create(&path).unwrap();
    path
}
