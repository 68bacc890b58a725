//! System implementation of the command runner

use super::{CommandRunner, CommandSpec, RunOutput};
use crate::error::{AlphaCutError, AlphaCutResult};
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tracing::debug;

/// Poll interval while waiting on a deadline-bounded child
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Build a [`Command`] with platform flags applied.
///
/// On Windows the child is spawned with `CREATE_NO_WINDOW` so console
/// windows do not flash during batch processing.
pub fn hidden_command(program: &Path) -> Command {
    #[allow(unused_mut)]
    let mut cmd = Command::new(program);
    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        cmd.creation_flags(winapi::um::winbase::CREATE_NO_WINDOW);
    }
    cmd
}

/// Runner that spawns real processes
#[derive(Debug, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }

    fn run_with_deadline(&self, spec: &CommandSpec, limit: Duration) -> AlphaCutResult<RunOutput> {
        let mut child = hidden_command(&spec.program)
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Drain the pipes on their own threads; polling try_wait without
        // draining deadlocks once the child fills a pipe buffer.
        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();
        let stdout_thread = std::thread::spawn(move || read_pipe(stdout_pipe));
        let stderr_thread = std::thread::spawn(move || read_pipe(stderr_pipe));

        let deadline = Instant::now() + limit;
        let status = loop {
            match child.try_wait()? {
                Some(status) => break status,
                None => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        let _ = stdout_thread.join();
                        let _ = stderr_thread.join();
                        return Err(AlphaCutError::CommandTimeout {
                            program: spec.program.display().to_string(),
                            seconds: limit.as_secs(),
                        });
                    }
                    std::thread::sleep(WAIT_POLL_INTERVAL);
                }
            }
        };

        let stdout = stdout_thread.join().unwrap_or_default();
        let stderr = stderr_thread.join().unwrap_or_default();
        Ok(RunOutput {
            status_code: status.code(),
            stdout: String::from_utf8_lossy(&stdout).to_string(),
            stderr: String::from_utf8_lossy(&stderr).to_string(),
        })
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> AlphaCutResult<RunOutput> {
        debug!(
            "Running {} {}",
            spec.program.display(),
            spec.args.join(" ")
        );

        match spec.timeout {
            Some(limit) => self.run_with_deadline(spec, limit),
            None => {
                let output = hidden_command(&spec.program)
                    .args(&spec.args)
                    .stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped())
                    .output()?;
                Ok(RunOutput {
                    status_code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                })
            }
        }
    }
}

fn read_pipe<R: Read>(pipe: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf);
    }
    buf
}
