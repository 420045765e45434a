//! Process execution utilities
//!
//! Runs short-lived helper commands (the python `sys.prefix` lookup) and
//! captures their output.

use crate::error::{InstallerError, Result};
use std::process::{Command, Stdio};
use tracing::{debug, instrument};

/// Utility for running external processes
#[derive(Debug)]
pub struct ProcessRunner {
    debug: bool,
}

/// Result of a process execution
#[derive(Debug)]
pub struct ProcessResult {
    /// Standard output
    pub stdout: String,
}

impl ProcessRunner {
    /// Create a new process runner
    #[must_use]
    pub const fn new(debug: bool) -> Self {
        Self { debug }
    }

    /// Run a command and capture its output
    #[instrument(skip(self))]
    pub fn run_command_with_output(&self, command: &str, args: &[&str]) -> Result<ProcessResult> {
        let cmd_str = format!("{} {}", command, args.join(" "));

        if self.debug {
            debug!("Running command with output capture: {}", cmd_str);
        }

        let output = Command::new(command)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                InstallerError::process(
                    cmd_str.clone(),
                    None,
                    String::new(),
                    format!("Failed to execute command: {e}"),
                )
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let exit_code = output.status.code();

        debug!(
            "Command finished: success={}, exit_code={:?}, stdout_len={}, stderr_len={}",
            output.status.success(),
            exit_code,
            stdout.len(),
            stderr.len()
        );

        if !output.status.success() {
            debug!("Command stderr: {}", stderr);
            return Err(InstallerError::process(cmd_str, exit_code, stdout, stderr));
        }

        Ok(ProcessResult { stdout })
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_runner_creation() {
        let runner = ProcessRunner::new(true);
        assert!(runner.debug);

        let runner = ProcessRunner::default();
        assert!(!runner.debug);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_command_with_output() {
        let runner = ProcessRunner::new(false);
        let result = runner
            .run_command_with_output("echo", &["hello", "world"])
            .unwrap();

        assert_eq!(result.stdout.trim(), "hello world");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_failing_command() {
        let runner = ProcessRunner::new(false);
        let result = runner.run_command_with_output("sh", &["-c", "echo oops >&2; exit 3"]);

        if let Err(InstallerError::Process {
            exit_code, stderr, ..
        }) = result
        {
            assert_eq!(exit_code, Some(3));
            assert_eq!(stderr.trim(), "oops");
        } else {
            panic!("Expected ProcessError");
        }
    }

    #[test]
    fn test_missing_command() {
        let runner = ProcessRunner::new(false);
        let result = runner.run_command_with_output("nonexistent_command_12345", &[]);

        match result {
            Err(InstallerError::Process {
                command, exit_code, ..
            }) => {
                assert_eq!(command, "nonexistent_command_12345 ");
                assert_eq!(exit_code, None);
            }
            other => panic!("Expected ProcessError, got {other:?}"),
        }
    }
}
