//! Child-process handle with a bounded wait
//!
//! stdout and stderr are drained on helper threads so a child that writes
//! more than a pipe buffer never blocks. Each thread hands its buffer back
//! over a channel once the stream closes, which lets the deadline cover the
//! drain as well as the exit. The handle owns the child: it is reaped by
//! `wait`, or killed and reaped on drop.

use eaa_core::{HarnessError, ProcessResult};
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A spawned CLI invocation whose output has not been collected yet
#[derive(Debug)]
pub struct RunningProcess {
    command: String,
    child: Child,
    reaped: bool,
    stdout: Option<Receiver<Vec<u8>>>,
    stderr: Option<Receiver<Vec<u8>>>,
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = reader.read_to_end(&mut buf);
        // The receiver is gone if the wait already timed out.
        let _ = tx.send(buf);
    });
    rx
}

/// Receive a drained stream, giving up at `deadline`
///
/// `None` means the stream was still open when the deadline passed.
fn collect(stream: Option<Receiver<Vec<u8>>>, deadline: Option<Instant>) -> Option<String> {
    let Some(rx) = stream else {
        return Some(String::new());
    };
    let bytes = match deadline {
        Some(deadline) => match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Ok(bytes) => bytes,
            Err(RecvTimeoutError::Timeout) => return None,
            Err(RecvTimeoutError::Disconnected) => Vec::new(),
        },
        None => rx.recv().unwrap_or_default(),
    };
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

impl RunningProcess {
    /// Start `argv[0]` with the remaining words as arguments, stdin closed
    ///
    /// # Errors
    ///
    /// Returns `HarnessError::EmptyCommand` for an empty vector and
    /// `HarnessError::Spawn` if the executable cannot be started
    pub fn spawn(argv: &[String]) -> Result<Self, HarnessError> {
        let (program, args) = argv.split_first().ok_or(HarnessError::EmptyCommand)?;
        let command = eaa_lexer::join(argv);

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| HarnessError::Spawn {
                command: command.clone(),
                source,
            })?;
        debug!(pid = child.id(), %command, "spawned");

        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        Ok(Self {
            command,
            child,
            reaped: false,
            stdout,
            stderr,
        })
    }

    /// The argv rendered as a shell-quoted line
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    #[must_use]
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Block until the child exits and both streams close, or kill it once
    /// `timeout` elapses
    ///
    /// `None` waits without limit. The deadline also covers draining the
    /// streams, so a grandchild that keeps them open cannot stall the wait.
    ///
    /// # Errors
    ///
    /// Returns `HarnessError::Timeout` if the deadline passed (the child has
    /// been killed and reaped by then) and `HarnessError::Wait` if the
    /// child's status could not be read
    pub fn wait(mut self, timeout: Option<Duration>) -> Result<ProcessResult, HarnessError> {
        let deadline = timeout.and_then(|limit| Instant::now().checked_add(limit));

        let status = match timeout {
            Some(limit) => self.poll(limit)?,
            None => match self.child.wait() {
                Ok(status) => status,
                Err(source) => {
                    self.reap();
                    return Err(self.wait_error(source));
                }
            },
        };
        self.reaped = true;

        let stdout = collect(self.stdout.take(), deadline);
        let stderr = collect(self.stderr.take(), deadline);
        let (Some(stdout), Some(stderr)) = (stdout, stderr) else {
            // Only a bounded wait gives up on a stream.
            warn!(command = %self.command, "child exited but its output is still open");
            return Err(self.timeout_error(timeout.unwrap_or_default()));
        };

        Ok(ProcessResult {
            stdout,
            stderr,
            code: status.code().unwrap_or(-1),
        })
    }

    fn poll(&mut self, limit: Duration) -> Result<ExitStatus, HarnessError> {
        let started = Instant::now();
        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {}
                Err(source) => {
                    self.reap();
                    return Err(self.wait_error(source));
                }
            }
            if started.elapsed() >= limit {
                warn!(command = %self.command, ?limit, "timed out, killing child");
                self.reap();
                // A grandchild may still hold the pipes open; leave the
                // reader threads detached rather than block on them.
                self.stdout.take();
                self.stderr.take();
                return Err(self.timeout_error(limit));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    fn reap(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        self.reaped = true;
    }

    fn timeout_error(&self, timeout: Duration) -> HarnessError {
        HarnessError::Timeout {
            command: self.command.clone(),
            timeout,
        }
    }

    fn wait_error(&self, source: std::io::Error) -> HarnessError {
        HarnessError::Wait {
            command: self.command.clone(),
            source,
        }
    }
}

impl Drop for RunningProcess {
    fn drop(&mut self) {
        if !self.reaped {
            debug!(command = %self.command, "dropping unfinished child");
            self.reap();
        }
    }
}
