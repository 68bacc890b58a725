//! External-process invocation seam
//!
//! Everything that shells out (probing, muxing, compressing) goes through
//! [`CommandRunner`] so tests can substitute canned results for real
//! binaries.

pub mod locate;
pub mod runner;

pub use locate::{find_ffmpeg, find_ffprobe};
pub use runner::{hidden_command, SystemRunner};

use crate::error::AlphaCutResult;
use std::path::PathBuf;
use std::time::Duration;

/// One external command invocation: program, arguments, optional deadline
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// Binary to execute
    pub program: PathBuf,
    /// Arguments, one per element, unquoted
    pub args: Vec<String>,
    /// Kill the process and report a timeout once this elapses
    pub timeout: Option<Duration>,
}

impl CommandSpec {
    /// Build a spec with no deadline
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: None,
        }
    }

    /// Bound the invocation with a deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Exit code, `None` when terminated by a signal
    pub status_code: Option<i32>,
    /// Captured stdout, lossily decoded
    pub stdout: String,
    /// Captured stderr, lossily decoded
    pub stderr: String,
}

impl RunOutput {
    /// True iff the process exited with code 0
    pub fn success(&self) -> bool {
        self.status_code == Some(0)
    }
}

/// Seam for spawning external tools
pub trait CommandRunner: Send + Sync {
    /// Run to completion, capturing stdout/stderr.
    ///
    /// `Err` means the command could not be run (spawn failure, timeout);
    /// a non-zero exit is reported through [`RunOutput::success`], not as
    /// an error, so callers decide what failure means per call site.
    fn run(&self, spec: &CommandSpec) -> AlphaCutResult<RunOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_requires_zero_exit() {
        let out = RunOutput {
            status_code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
        };
        assert!(out.success());

        let out = RunOutput {
            status_code: Some(1),
            ..out
        };
        assert!(!out.success());

        let out = RunOutput {
            status_code: None,
            ..out
        };
        assert!(!out.success());
    }

    #[test]
    fn test_spec_builder() {
        let spec = CommandSpec::new("ffprobe", vec!["-v".to_string(), "error".to_string()])
            .with_timeout(Duration::from_secs(30));
        assert_eq!(spec.program, PathBuf::from("ffprobe"));
        assert_eq!(spec.timeout, Some(Duration::from_secs(30)));
    }
}
