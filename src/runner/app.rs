use std::ffi::OsStr;
use std::io::{self, Read, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use super::platform::{self, LaunchMode};
use crate::error::RunnerError;

/// Cadence for polling the child's exit status inside [`AppRunner::join`].
const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Result of a timeout-bounded read from the child's stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// One or more bytes were read, at most the requested budget.
    Data(Vec<u8>),
    /// The child closed its stdout; the stream is drained.
    Eof,
    /// The read did not complete within the timeout. The underlying read keeps
    /// running; the next `read` call waits on it.
    TimedOut,
}

/// Result of a timeout-bounded wait for child exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The child terminated with this status.
    Exited(ExitStatus),
    /// The child was still running at the deadline. It is NOT killed;
    /// termination policy belongs to the caller.
    TimedOut,
}

/// Message from the read worker back to the caller: the stdout handle returns
/// to the runner together with the read result.
struct ReadReply {
    stdout: ChildStdout,
    result: io::Result<Vec<u8>>,
}

/// A child process with piped standard input and output.
///
/// Each instance owns exactly one live child process and all parent-side pipe
/// handles; everything is released on drop. The type is move-only; duplicating
/// it would duplicate ownership of OS resources.
///
/// Dropping an `AppRunner` never kills the child. Detached children are
/// expected to outlive the parent; use [`kill`](Self::kill) for explicit
/// termination.
#[derive(Debug)]
pub struct AppRunner {
    child: Child,
    pid: u32,
    stdin: Option<ChildStdin>,
    /// Parent's read end of the child's stdout. `None` while a read worker
    /// owns the handle.
    stdout: Option<ChildStdout>,
    /// Completion channel of a read that outlived its timeout.
    pending: Option<Receiver<ReadReply>>,
    saw_eof: bool,
}

impl AppRunner {
    /// Launch `program` in a new process group with no console attachment.
    ///
    /// The command line is `"<program>" <args>`: the program path quoted, the
    /// argument string appended verbatim (split shell-style on non-Windows
    /// platforms, which have no single-string command line).
    ///
    /// # Errors
    ///
    /// Fails if pipe or process creation fails, with the OS error as source.
    pub fn spawn_detached(program: impl AsRef<OsStr>, args: &str) -> Result<Self, RunnerError> {
        Self::spawn(program.as_ref(), args, LaunchMode::Detached)
    }

    /// Launch `program` with its console window suppressed.
    ///
    /// Same command-line and pipe contract as [`spawn_detached`](Self::spawn_detached).
    ///
    /// # Errors
    ///
    /// Fails if pipe or process creation fails, with the OS error as source.
    pub fn spawn_no_console(program: impl AsRef<OsStr>, args: &str) -> Result<Self, RunnerError> {
        Self::spawn(program.as_ref(), args, LaunchMode::NoConsole)
    }

    fn spawn(program: &OsStr, args: &str, mode: LaunchMode) -> Result<Self, RunnerError> {
        let mut command = Command::new(program);
        platform::append_args(&mut command, args)?;
        platform::configure(&mut command, mode);
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            // stderr is not part of the contract; an unread pipe could stall
            // the child, and a detached child has no console to inherit.
            .stderr(Stdio::null());

        let mut child = command.spawn().map_err(|source| RunnerError::Launch {
            program: program.to_string_lossy().into_owned(),
            source,
        })?;

        let pid = child.id();
        debug!(
            pid,
            mode = mode.as_str(),
            command = %command_line_preview(program, args),
            "launched child process"
        );

        // The standard library hands the child its pipe ends and closes the
        // parent's copies at spawn, so end-of-file on stdout is observable
        // once the child exits.
        let stdin = child.stdin.take();
        let stdout = child.stdout.take();

        Ok(Self {
            child,
            pid,
            stdin,
            stdout,
            pending: None,
            saw_eof: false,
        })
    }

    /// The OS process id of the child.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.pid
    }

    /// Blocking write of `data` to the child's stdin.
    ///
    /// # Errors
    ///
    /// Fails with a broken-pipe source if the child has exited or closed its
    /// stdin, and with [`RunnerError::StdinClosed`] after
    /// [`close_stdin`](Self::close_stdin).
    pub fn write(&mut self, data: &[u8]) -> Result<(), RunnerError> {
        let stdin = self.stdin.as_mut().ok_or(RunnerError::StdinClosed)?;
        stdin
            .write_all(data)
            .and_then(|()| stdin.flush())
            .map_err(RunnerError::StdinWrite)
    }

    /// Close the child's stdin, signalling end of input.
    ///
    /// Idempotent. Children that read stdin to completion will not see EOF
    /// until this is called or the runner is dropped.
    pub fn close_stdin(&mut self) {
        if self.stdin.take().is_some() {
            trace!(pid = self.pid, "closed child stdin");
        }
    }

    /// Read up to `max_bytes` from the child's stdout, blocking the caller for
    /// at most `timeout`.
    ///
    /// The blocking OS read runs on a background worker thread that owns the
    /// stdout handle and destination buffer until it completes; the caller
    /// waits on its completion channel. On [`ReadOutcome::TimedOut`] the worker
    /// keeps running, and the next `read` call waits on the same outstanding
    /// operation (with that operation's original byte budget), so the pipe is
    /// never consumed by two readers at once.
    ///
    /// A zero `max_bytes` budget returns empty [`ReadOutcome::Data`] without
    /// touching the pipe, so it cannot be mistaken for the end-of-stream
    /// signal.
    ///
    /// # Errors
    ///
    /// Fails if the worker cannot be spawned, dies without reporting, or the
    /// OS read itself fails.
    pub fn read(&mut self, max_bytes: usize, timeout: Duration) -> Result<ReadOutcome, RunnerError> {
        if max_bytes == 0 {
            return Ok(ReadOutcome::Data(Vec::new()));
        }
        if self.saw_eof {
            return Ok(ReadOutcome::Eof);
        }

        let rx = match self.pending.take() {
            Some(rx) => rx,
            None => {
                let Some(stdout) = self.stdout.take() else {
                    // The handle only leaves the instance while a worker holds
                    // it or after end of stream; treat anything else as drained.
                    return Ok(ReadOutcome::Eof);
                };
                spawn_read_worker(stdout, max_bytes)?
            }
        };

        match rx.recv_timeout(timeout) {
            Ok(ReadReply { stdout, result }) => {
                self.stdout = Some(stdout);
                let data = result.map_err(RunnerError::StdoutRead)?;
                if data.is_empty() {
                    trace!(pid = self.pid, "child closed stdout");
                    self.saw_eof = true;
                    Ok(ReadOutcome::Eof)
                } else {
                    trace!(pid = self.pid, bytes = data.len(), "read from child stdout");
                    Ok(ReadOutcome::Data(data))
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                trace!(
                    pid = self.pid,
                    timeout_ms = timeout.as_millis() as u64,
                    "read timed out; worker remains outstanding"
                );
                self.pending = Some(rx);
                Ok(ReadOutcome::TimedOut)
            }
            Err(RecvTimeoutError::Disconnected) => Err(RunnerError::WorkerLost),
        }
    }

    /// Wait up to `timeout` for the child to terminate.
    ///
    /// On [`WaitOutcome::TimedOut`] the child keeps running. Valid at any point
    /// after creation; `read`/`write` stay valid just after exit to drain
    /// remaining buffered output.
    ///
    /// # Errors
    ///
    /// Fails if polling the child's exit status fails.
    pub fn join(&mut self, timeout: Duration) -> Result<WaitOutcome, RunnerError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = self.child.try_wait().map_err(RunnerError::Wait)? {
                debug!(pid = self.pid, code = ?status.code(), "child exited");
                return Ok(WaitOutcome::Exited(status));
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(WaitOutcome::TimedOut);
            }
            thread::sleep(JOIN_POLL_INTERVAL.min(deadline - now));
        }
    }

    /// Forcibly terminate the child.
    ///
    /// Not called from any drop path; explicit termination policy only.
    ///
    /// # Errors
    ///
    /// Fails if the OS refuses the termination request.
    pub fn kill(&mut self) -> Result<(), RunnerError> {
        self.child.kill().map_err(|source| RunnerError::Kill {
            pid: self.pid,
            source,
        })
    }
}

/// Spawn the worker that performs one blocking read on the child's stdout.
///
/// The worker owns the handle and buffer until its read returns (at the
/// latest when the child closes stdout), then hands both back over the
/// channel. If the runner was dropped in the meantime the send fails and the
/// worker simply exits; nothing leaks.
fn spawn_read_worker(
    mut stdout: ChildStdout,
    max_bytes: usize,
) -> Result<Receiver<ReadReply>, RunnerError> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("wincommon-read".to_string())
        .spawn(move || {
            let mut buf = vec![0u8; max_bytes];
            let result = stdout.read(&mut buf).map(|n| {
                buf.truncate(n);
                buf
            });
            let _ = tx.send(ReadReply { stdout, result });
        })
        .map_err(RunnerError::WorkerSpawn)?;
    Ok(rx)
}

/// `"<program>" <args>` as handed to the OS, for spawn logging.
fn command_line_preview(program: &OsStr, args: &str) -> String {
    if args.is_empty() {
        format!("\"{}\"", program.to_string_lossy())
    } else {
        format!("\"{}\" {}", program.to_string_lossy(), args)
    }
}
