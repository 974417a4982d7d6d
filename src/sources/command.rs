//! External command execution
//!
//! Adapters call tools such as `sensors` and `nvidia-smi` through the
//! [`CommandRunner`] trait so they can be tested with scripted output.

use crate::error::SourceError;

use std::io::{ErrorKind, Read};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

/// Runs an external program and returns its stdout
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`; non-zero exit, spawn failure and timeout are errors
    fn run(&self, program: &str, args: &[&str]) -> Result<String, SourceError>;

    /// Start `program` without waiting for it to exit
    fn spawn(&self, program: &str, args: &[&str]) -> Result<(), SourceError>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, program: &str, args: &[&str]) -> Result<String, SourceError> {
        (**self).run(program, args)
    }

    fn spawn(&self, program: &str, args: &[&str]) -> Result<(), SourceError> {
        (**self).spawn(program, args)
    }
}

fn spawn_error(program: &str, err: std::io::Error) -> SourceError {
    match err.kind() {
        ErrorKind::NotFound => SourceError::unavailable(program, "command not found"),
        _ => SourceError::unavailable(program, err),
    }
}

/// Runs real processes with a wall-clock timeout
#[derive(Debug, Clone, Copy)]
pub struct SystemCommandRunner {
    timeout: Duration,
}

impl SystemCommandRunner {
    const POLL_INTERVAL: Duration = Duration::from_millis(10);

    /// Create a runner that kills commands running longer than `timeout`
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Configured timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn timeout_error(&self, program: &str) -> SourceError {
        SourceError::Timeout {
            command: program.to_string(),
            millis: self.timeout.as_millis() as u64,
        }
    }
}

impl Default for SystemCommandRunner {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<String, SourceError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| spawn_error(program, e))?;

        // Drain stdout on a separate thread so a chatty child cannot block on a full pipe.
        // The pipe can outlive the child when a grandchild inherits it.
        let (tx, rx) = mpsc::channel();
        if let Some(mut stdout) = child.stdout.take() {
            thread::spawn(move || {
                let mut out = Vec::new();
                let _ = stdout.read_to_end(&mut out);
                let _ = tx.send(out);
            });
        } else {
            drop(tx);
        }

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(self.timeout_error(program));
                    }
                    thread::sleep(Self::POLL_INTERVAL);
                }
                Err(e) => return Err(SourceError::unavailable(program, e)),
            }
        };

        let output = match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Ok(out) => out,
            Err(RecvTimeoutError::Timeout) => return Err(self.timeout_error(program)),
            Err(RecvTimeoutError::Disconnected) => Vec::new(),
        };

        if !status.success() {
            return Err(SourceError::unavailable(
                program,
                format!("exited with {}", status),
            ));
        }

        Ok(String::from_utf8_lossy(&output).into_owned())
    }

    fn spawn(&self, program: &str, args: &[&str]) -> Result<(), SourceError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| spawn_error(program, e))?;

        // Reap in the background so long-running watch loops leave no zombies.
        thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }
}
