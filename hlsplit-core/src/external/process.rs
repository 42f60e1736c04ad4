// ============================================================================
// hlsplit-core/src/external/process.rs
// ============================================================================
//
// PROCESS RUNNER: Supervised Execution of External Commands
//
// This module launches external tools and supervises them until they exit or
// the owning JobContext is cancelled.
//
// KEY COMPONENTS:
// - ProcessRunner: trait seam used by the prober and the splitter
// - SystemProcessRunner: std::process implementation
// - ProcessOutput: captured stdout/stderr of a buffered run
//
// STREAMING MODEL:
// `run_streaming` spawns the child synchronously, so a missing executable is
// reported before any output is produced. One reader thread per pipe splits
// its stream into lines and pushes them into a single bounded channel. The
// calling thread blocks in `select!` on three sources:
// - a line arrives: non-blank lines are handed to the sink in arrival order
// - the exit poll ticks and `try_wait` reports an exit status: that status
//   decides the result, after the lines still in flight are drained
// - cancellation fires: if the child has already exited it is treated as an
//   exit; otherwise delivery stops, the child is killed and reaped with a
//   bounded wait, and `CoreError::Cancelled` is returned
//
// Once the exit is observed, cancellation no longer changes the outcome.
// Draining stops when both pipes reach EOF or when no line arrives for
// EXIT_DRAIN_IDLE, since a descendant of the child may keep a pipe open.
//
// The child is owned by a guard that kills and reaps it on every exit path,
// including a panicking sink.
//
// AI-ASSISTANT-INFO: Cancellable streaming subprocess supervisor

// ---- External crate imports ----
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded, never, select, tick};
use log::{debug, trace, warn};

// ---- Internal crate imports ----
use crate::config::DEFAULT_REAP_GRACE;
use crate::context::{JobContext, WorkGuard};
use crate::error::{
    CoreError, CoreResult, command_failed_error, command_start_error, command_wait_error,
};
use crate::logging::log_command;

// ---- Standard library imports ----
use std::collections::VecDeque;
use std::io::{self, BufRead, BufReader, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Capacity of the channel between the pipe readers and the supervisor.
const LINE_CHANNEL_CAPACITY: usize = 256;

/// Number of trailing output lines kept as diagnostics for a failed run.
const DIAGNOSTIC_TAIL_LINES: usize = 64;

const REAP_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How often a streaming run checks whether its child has exited.
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// After the child exits, draining stops once no line arrives for this long.
const EXIT_DRAIN_IDLE: Duration = Duration::from_millis(250);

/// Output captured from a process that ran to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    /// Stdout followed by stderr.
    pub fn combined(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => {
                let mut text = self.stdout.clone();
                if !text.ends_with('\n') {
                    text.push('\n');
                }
                text.push_str(&self.stderr);
                text
            }
        }
    }
}

/// Launches external commands.
///
/// Implementations must be shareable across threads so a single runner can
/// serve a batch of concurrent splits.
pub trait ProcessRunner: Send + Sync {
    /// Runs `program` to completion and returns its stdout and stderr.
    ///
    /// A non-zero exit is reported as `CoreError::CommandFailed` whose
    /// `output` holds the combined text.
    fn run_captured(&self, program: &str, args: &[String]) -> CoreResult<ProcessOutput>;

    /// Runs `program` while delivering each non-blank output line to `sink`.
    ///
    /// Returns `Ok(())` on a zero exit status, `CoreError::Cancelled` if `ctx`
    /// was cancelled before the process exited, or the process error
    /// otherwise.
    ///
    /// # Panics
    ///
    /// The run is registered on `ctx` for its duration, so this panics if
    /// `ctx` already drained.
    fn run_streaming(
        &self,
        ctx: &JobContext,
        program: &str,
        args: &[String],
        sink: &mut dyn FnMut(&str),
    ) -> CoreResult<()>;

    /// Runs `program` to completion and returns stdout and stderr combined.
    fn run_buffered(&self, program: &str, args: &[String]) -> CoreResult<String> {
        self.run_captured(program, args).map(|output| output.combined())
    }
}

/// [`ProcessRunner`] backed by `std::process`.
#[derive(Debug, Clone)]
pub struct SystemProcessRunner {
    reap_grace: Duration,
}

impl Default for SystemProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemProcessRunner {
    pub fn new() -> Self {
        Self {
            reap_grace: DEFAULT_REAP_GRACE,
        }
    }

    /// Sets how long a killed child is polled for exit.
    #[must_use]
    pub fn with_reap_grace(mut self, grace: Duration) -> Self {
        self.reap_grace = grace;
        self
    }

    pub fn reap_grace(&self) -> Duration {
        self.reap_grace
    }
}

impl ProcessRunner for SystemProcessRunner {
    fn run_captured(&self, program: &str, args: &[String]) -> CoreResult<ProcessOutput> {
        let mut cmd = Command::new(program);
        cmd.args(args).stdin(Stdio::null());
        log_command(&cmd);

        let output = cmd.output().map_err(|e| command_start_error(program, e))?;
        let captured = ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !output.status.success() {
            debug!("{} exited with {}", program, output.status);
            return Err(command_failed_error(program, output.status, captured.combined()));
        }
        Ok(captured)
    }

    fn run_streaming(
        &self,
        ctx: &JobContext,
        program: &str,
        args: &[String],
        sink: &mut dyn FnMut(&str),
    ) -> CoreResult<()> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        log_command(&cmd);

        let mut child = cmd.spawn().map_err(|e| command_start_error(program, e))?;
        let pipes = child.stdout.take().zip(child.stderr.take());
        let mut child = ChildGuard::new(child, self.reap_grace);
        let Some((stdout, stderr)) = pipes else {
            child.terminate();
            return Err(CoreError::CommandStart {
                command: program.to_string(),
                source: io::Error::other("output pipes were not captured"),
            });
        };

        let _work = WorkGuard::register(ctx);
        if ctx.is_cancelled() {
            debug!("{program} cancelled before streaming started");
            child.terminate();
            return Err(CoreError::Cancelled);
        }

        let (tx, rx) = bounded::<String>(LINE_CHANNEL_CAPACITY);
        let readers = [
            spawn_line_reader("stdout", stdout, tx.clone()),
            spawn_line_reader("stderr", stderr, tx),
        ];
        let cancelled = ctx.cancelled();
        let exit_poll = tick(EXIT_POLL_INTERVAL);
        let closed = never::<String>();
        let mut relay = LineRelay::default();
        let mut pipes_open = true;

        let status = loop {
            let lines = if pipes_open { &rx } else { &closed };
            select! {
                recv(lines) -> message => match message {
                    Ok(line) => relay.deliver(sink, &line),
                    Err(_) => pipes_open = false,
                },
                recv(exit_poll) -> _ => {
                    if let Some(status) = child.try_wait().map_err(|e| command_wait_error(program, e))? {
                        break status;
                    }
                },
                recv(cancelled) -> _ => {
                    if let Some(status) = child.try_wait().map_err(|e| command_wait_error(program, e))? {
                        debug!("{program} had already exited when cancellation arrived");
                        break status;
                    }
                    debug!("{program} cancelled, terminating child");
                    child.terminate();
                    return Err(CoreError::Cancelled);
                }
            }
        };

        if pipes_open {
            pipes_open = relay.drain(sink, &rx);
        }
        drop(rx);
        if pipes_open {
            debug!("{program} exited but its output is still held open, detaching readers");
        } else {
            for reader in readers {
                if reader.join().is_err() {
                    warn!("{program} output reader thread panicked");
                }
            }
        }

        if status.success() {
            Ok(())
        } else {
            Err(command_failed_error(program, status, relay.diagnostics()))
        }
    }
}

/// Hands non-blank lines to the sink and keeps the last few for diagnostics.
#[derive(Default)]
struct LineRelay {
    tail: VecDeque<String>,
}

impl LineRelay {
    fn deliver(&mut self, sink: &mut dyn FnMut(&str), line: &str) {
        if line.trim().is_empty() {
            return;
        }
        if self.tail.len() == DIAGNOSTIC_TAIL_LINES {
            self.tail.pop_front();
        }
        self.tail.push_back(line.to_string());
        sink(line);
    }

    /// Delivers what is left after the child exited. Returns true if the
    /// pipes were still open when draining gave up.
    fn drain(&mut self, sink: &mut dyn FnMut(&str), rx: &Receiver<String>) -> bool {
        loop {
            match rx.recv_timeout(EXIT_DRAIN_IDLE) {
                Ok(line) => self.deliver(sink, &line),
                Err(RecvTimeoutError::Disconnected) => return false,
                Err(RecvTimeoutError::Timeout) => return true,
            }
        }
    }

    fn diagnostics(&self) -> String {
        self.tail.iter().map(String::as_str).collect::<Vec<_>>().join("\n")
    }
}

/// Owns a running child and makes sure it is reaped.
struct ChildGuard {
    child: Option<Child>,
    grace: Duration,
}

impl ChildGuard {
    fn new(child: Child, grace: Duration) -> Self {
        Self {
            child: Some(child),
            grace,
        }
    }

    /// Non-blocking exit check. The child is released once it has exited.
    fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
        let Some(child) = self.child.as_mut() else {
            return Err(io::Error::other("child already released"));
        };
        let status = child.try_wait()?;
        if status.is_some() {
            self.child = None;
        }
        Ok(status)
    }

    /// Kills the child and polls for its exit for at most the grace period.
    fn terminate(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };
        if let Err(e) = child.kill() {
            // InvalidInput means it already exited.
            trace!("kill of pid {} failed: {}", child.id(), e);
        }
        let deadline = Instant::now() + self.grace;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    trace!("pid {} reaped with {}", child.id(), status);
                    return;
                }
                Ok(None) if Instant::now() < deadline => thread::sleep(REAP_POLL_INTERVAL),
                Ok(None) => {
                    warn!(
                        "pid {} did not exit within {:?} after kill",
                        child.id(),
                        self.grace
                    );
                    return;
                }
                Err(e) => {
                    warn!("failed to reap pid {}: {}", child.id(), e);
                    return;
                }
            }
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        self.terminate();
    }
}

fn spawn_line_reader<R>(label: &'static str, pipe: R, tx: Sender<String>) -> JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(pipe);
        let mut buf = Vec::new();
        loop {
            match read_segment(&mut reader, &mut buf) {
                Ok(true) => {
                    let line = String::from_utf8_lossy(&buf).into_owned();
                    if tx.send(line).is_err() {
                        // Supervisor stopped listening.
                        return;
                    }
                }
                Ok(false) => return,
                Err(e) => {
                    debug!("{label} read error ends stream: {e}");
                    return;
                }
            }
        }
    })
}

/// Reads the next line into `buf`, treating both `\n` and `\r` as
/// terminators so ffmpeg's carriage-return status updates arrive one by one.
/// Returns `Ok(false)` at EOF with nothing read.
fn read_segment<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<bool> {
    buf.clear();
    loop {
        let available = match reader.fill_buf() {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if available.is_empty() {
            return Ok(!buf.is_empty());
        }
        match available.iter().position(|&b| b == b'\n' || b == b'\r') {
            Some(pos) => {
                buf.extend_from_slice(&available[..pos]);
                reader.consume(pos + 1);
                return Ok(true);
            }
            None => {
                let len = available.len();
                buf.extend_from_slice(available);
                reader.consume(len);
            }
        }
    }
}
