//! # External Command Execution
//!
//! Every interaction with `git`, `gh` and `bash` goes through the
//! [`CommandRunner`] trait. The orchestration code builds a [`Cmd`] describing
//! what to run and hands it to a runner; [`SystemRunner`] executes it for real,
//! while tests substitute a recording mock that returns scripted output.
//!
//! A `Cmd` can carry secrets (tokens inside clone URLs, `GH_TOKEN` in the
//! environment, stdin payloads). Its [`Display`](std::fmt::Display) output,
//! which is what ends up in logs and error messages, redacts URL credentials
//! and never prints environment values or stdin.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::debug;

use crate::error::{Error, Result};
use crate::git::redact_url;

/// A fully described external command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cmd {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub envs: Vec<(String, String)>,
    pub stdin: Option<String>,
}

impl Cmd {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// Program and arguments, e.g. `["git", "push"]`.
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}

impl fmt::Display for Cmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", redact_url(arg))?;
        }
        Ok(())
    }
}

/// Executes external commands.
pub trait CommandRunner {
    /// Runs the command with inherited stdout/stderr, failing on non-zero exit.
    fn run(&self, cmd: &Cmd) -> Result<()>;

    /// Runs the command and returns its trimmed stdout, failing on non-zero exit.
    fn capture(&self, cmd: &Cmd) -> Result<String>;
}

/// The real runner, backed by `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    fn command(cmd: &Cmd) -> Command {
        let mut command = Command::new(&cmd.program);
        command.args(&cmd.args);
        if let Some(dir) = &cmd.cwd {
            command.current_dir(dir);
        }
        command.envs(cmd.envs.iter().map(|(k, v)| (k, v)));
        command
    }

    fn spawn_error(cmd: &Cmd, err: std::io::Error) -> Error {
        Error::Command {
            command: cmd.to_string(),
            stderr: format!("failed to spawn: {}", err),
        }
    }

    fn feed_stdin(cmd: &Cmd, child: &mut std::process::Child) -> Result<()> {
        if let (Some(input), Some(mut stdin)) = (cmd.stdin.as_ref(), child.stdin.take()) {
            stdin.write_all(input.as_bytes())?;
        }
        Ok(())
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, cmd: &Cmd) -> Result<()> {
        debug!("run: {}", cmd);
        let mut command = Self::command(cmd);
        command.stdin(if cmd.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        // Child output belongs on stderr; stdout carries the CI output contract.
        command.stdout(Stdio::from(std::io::stderr()));
        command.stderr(Stdio::inherit());

        let mut child = command.spawn().map_err(|e| Self::spawn_error(cmd, e))?;
        Self::feed_stdin(cmd, &mut child)?;
        let status = child.wait()?;
        if !status.success() {
            return Err(Error::Command {
                command: cmd.to_string(),
                stderr: format!("exited with {}", status),
            });
        }
        Ok(())
    }

    fn capture(&self, cmd: &Cmd) -> Result<String> {
        debug!("capture: {}", cmd);
        let mut command = Self::command(cmd);
        command.stdin(if cmd.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());

        let mut child = command.spawn().map_err(|e| Self::spawn_error(cmd, e))?;
        Self::feed_stdin(cmd, &mut child)?;
        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(Error::Command {
                command: cmd.to_string(),
                stderr: redact_url(String::from_utf8_lossy(&output.stderr).trim()),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmd_builder() {
        let cmd = Cmd::new("git")
            .args(["status", "--porcelain"])
            .current_dir("/tmp/repo")
            .env("GIT_TERMINAL_PROMPT", "0");
        assert_eq!(cmd.argv(), vec!["git", "status", "--porcelain"]);
        assert_eq!(cmd.cwd, Some(PathBuf::from("/tmp/repo")));
        assert_eq!(cmd.envs, vec![("GIT_TERMINAL_PROMPT".into(), "0".into())]);
    }

    #[test]
    fn test_display_redacts_credentials() {
        let cmd = Cmd::new("git")
            .arg("clone")
            .arg("https://ghp_secret@github.com/owner/kernel.git")
            .env("GH_TOKEN", "ghp_secret")
            .stdin("ghp_secret");
        let shown = cmd.to_string();
        assert!(!shown.contains("ghp_secret"));
        assert!(shown.contains("github.com/owner/kernel.git"));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_capture() {
        let out = SystemRunner
            .capture(&Cmd::new("sh").args(["-c", "echo hello"]))
            .unwrap();
        assert_eq!(out, "hello");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_passes_stdin() {
        let out = SystemRunner
            .capture(&Cmd::new("cat").stdin("from stdin"))
            .unwrap();
        assert_eq!(out, "from stdin");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_reports_failure() {
        let err = SystemRunner
            .capture(&Cmd::new("sh").args(["-c", "echo boom >&2; exit 3"]))
            .unwrap_err();
        assert!(matches!(err, Error::Command { ref stderr, .. } if stderr == "boom"));
    }

    #[test]
    fn test_system_runner_missing_program() {
        let err = SystemRunner
            .run(&Cmd::new("definitely-not-a-real-program-ci-core"))
            .unwrap_err();
        assert!(err.to_string().contains("failed to spawn"));
    }
}
