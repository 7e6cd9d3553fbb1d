//! # External Process Runner
//!
//! Executes one converter invocation and blocks until it terminates.
//!
//! The [`ProcessRunner`] trait is the seam the orchestrator drives; the
//! production implementation is [`SystemProcessRunner`]. Tests substitute a
//! scripted runner that fabricates output files instead of spawning vendor
//! tools.
//!
//! ## Standard output handling
//!
//! Some vendor tools write a lot to stdout. When stdout is a pipe that nobody
//! reads, the child eventually blocks on a full pipe and never exits.
//! [`StdoutMode::Drain`] pipes stdout and consumes it on a helper thread
//! (each line is logged at `trace` level). The orchestrator selects it for
//! directory-style inputs whose source path ends in `.d`.
//!
//! There is no timeout and no cancellation: a hung converter hangs the job
//! that launched it.

mod error;

use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, trace, warn};

pub use error::RunnerError;

/// How the child's standard output is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StdoutMode {
    /// Child inherits the parent's stdout
    #[default]
    Inherit,
    /// Stdout is piped and drained on a helper thread
    Drain,
}

impl StdoutMode {
    /// Mode required for a given source path: directory-style `.d`
    /// acquisitions are drained.
    pub fn for_source(source: &str) -> Self {
        let trimmed = source.trim_end_matches(['/', '\\']);
        if trimmed.ends_with(".d") {
            StdoutMode::Drain
        } else {
            StdoutMode::Inherit
        }
    }
}

/// Result of one completed process execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Exit code, `None` when terminated by a signal
    pub exit_code: Option<i32>,
    /// Whether the process reported success
    pub success: bool,
    /// Wall-clock time spent waiting for the process
    pub elapsed: Duration,
}

impl RunReport {
    /// Report for a successful run, used by scripted runners.
    pub fn succeeded(elapsed: Duration) -> Self {
        Self {
            exit_code: Some(0),
            success: true,
            elapsed,
        }
    }
}

/// Executes external converter commands.
pub trait ProcessRunner: Send + Sync {
    /// Run `argv` (program first) to completion.
    ///
    /// Implementations must not interpret the exit status; that is the
    /// orchestrator's policy decision.
    fn run(&self, argv: &[String], stdout: StdoutMode) -> Result<RunReport, RunnerError>;
}

/// Runs commands with [`std::process::Command`].
#[derive(Debug, Clone, Default)]
pub struct SystemProcessRunner;

impl SystemProcessRunner {
    /// Create a new runner.
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, argv: &[String], stdout: StdoutMode) -> Result<RunReport, RunnerError> {
        let (program, args) = argv.split_first().ok_or(RunnerError::EmptyCommand)?;

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit());
        match stdout {
            StdoutMode::Inherit => command.stdout(Stdio::inherit()),
            StdoutMode::Drain => command.stdout(Stdio::piped()),
        };

        debug!("Launching {:?}", argv);
        let started = Instant::now();
        let mut child = command.spawn().map_err(|source| RunnerError::Launch {
            program: program.clone(),
            source,
        })?;

        let drain = child.stdout.take().map(|pipe| {
            let name = program.clone();
            thread::spawn(move || {
                let reader = BufReader::new(pipe);
                for line in reader.lines() {
                    match line {
                        Ok(line) => trace!("[{}] {}", name, line),
                        Err(_) => break,
                    }
                }
            })
        });

        let status = child.wait().map_err(|source| RunnerError::WaitInterrupted {
            program: program.clone(),
            source,
        })?;

        if let Some(handle) = drain {
            if handle.join().is_err() {
                warn!("stdout drain thread for '{}' panicked", program);
            }
        }

        let elapsed = started.elapsed();
        debug!(
            "'{}' finished with {} after {:.2}s",
            program,
            status,
            elapsed.as_secs_f64()
        );

        Ok(RunReport {
            exit_code: status.code(),
            success: status.success(),
            elapsed,
        })
    }
}
