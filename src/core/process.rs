//! External tool invocation
//!
//! Every pipeline step that is not pure text processing is a call to some
//! command-line tool. `ExternalCommand` records what is about to run so that a
//! failure can name both the step ("While signing Telegram.") and the exact
//! command line.

use crate::core::error::{ProcessError, ReleaseResult};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// A command line to run, with optional working directory
#[derive(Debug, Clone)]
pub struct ExternalCommand {
  program: OsString,
  args: Vec<OsString>,
  cwd: Option<PathBuf>,
}

impl ExternalCommand {
  pub fn new(program: impl AsRef<OsStr>) -> Self {
    Self {
      program: program.as_ref().to_os_string(),
      args: Vec::new(),
      cwd: None,
    }
  }

  /// Build from a `[program, args...]` list (config-provided commands)
  pub fn from_argv(argv: &[String]) -> Option<Self> {
    let (program, args) = argv.split_first()?;
    Some(Self::new(program).args(args))
  }

  pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
    self.args.push(arg.as_ref().to_os_string());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
  {
    self.args.extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
    self
  }

  pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
    self.cwd = Some(dir.as_ref().to_path_buf());
    self
  }

  /// Printable command line, for logs and error messages
  pub fn display(&self) -> String {
    std::iter::once(&self.program)
      .chain(self.args.iter())
      .map(|part| {
        let text = part.to_string_lossy();
        if text.is_empty() || text.contains(char::is_whitespace) {
          format!("\"{}\"", text)
        } else {
          text.into_owned()
        }
      })
      .collect::<Vec<_>>()
      .join(" ")
  }

  fn command(&self) -> Command {
    let mut cmd = Command::new(&self.program);
    cmd.args(&self.args);
    if let Some(cwd) = &self.cwd {
      cmd.current_dir(cwd);
    }
    cmd
  }

  /// Run with inherited stdio; non-zero exit is an error naming `step`
  pub fn run(&self, step: &str) -> ReleaseResult<()> {
    let line = self.display();
    tracing::debug!(command = %line, cwd = ?self.cwd, "running");

    let status = self
      .command()
      .stdin(Stdio::null())
      .status()
      .map_err(|e| self.spawn_error(step, e))?;

    if !status.success() {
      return Err(
        ProcessError::Failed {
          step: step.to_string(),
          command: line,
          status: status.code(),
          output: None,
        }
        .into(),
      );
    }

    Ok(())
  }

  /// Run and return stdout followed by stderr
  ///
  /// Some tools (altool) write their report to stderr, so both streams are
  /// kept. Non-zero exit is an error carrying the captured text.
  pub fn capture(&self, step: &str) -> ReleaseResult<String> {
    let line = self.display();
    tracing::debug!(command = %line, cwd = ?self.cwd, "capturing");

    let output = self
      .command()
      .stdin(Stdio::null())
      .output()
      .map_err(|e| self.spawn_error(step, e))?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));

    if !output.status.success() {
      return Err(
        ProcessError::Failed {
          step: step.to_string(),
          command: line,
          status: output.status.code(),
          output: Some(text),
        }
        .into(),
      );
    }

    tracing::trace!(bytes = text.len(), "captured output");
    Ok(text)
  }

  fn spawn_error(&self, step: &str, err: std::io::Error) -> ProcessError {
    ProcessError::Spawn {
      step: step.to_string(),
      command: self.display(),
      reason: err.to_string(),
    }
  }
}
