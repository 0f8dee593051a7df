//! System git backend
//!
//! Changelogs are read straight from `git log`. Commands run with an isolated
//! environment so user aliases, pagers and colour settings cannot change the
//! output format the changelog parser depends on.

use crate::core::error::{ReleaseError, ReleaseResult, ResultExt, ValidationError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

/// Git backend using system git
pub struct SystemGit {
  /// Directory commands run in
  pub(crate) repo_path: PathBuf,

  /// Working tree root
  pub(crate) work_tree: PathBuf,
}

impl SystemGit {
  /// Open a git repository
  pub fn open(path: &Path) -> ReleaseResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(ReleaseError::with_help(
          format!("Git repository not found at: {}", path.display()),
          "Run compose from inside the application checkout or pass --root.",
        ));
      }
      return Err(ReleaseError::message(format!("Failed to open git repository: {}", stderr)));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let work_tree = stdout.trim();

    Ok(Self {
      repo_path: path.to_path_buf(),
      work_tree: PathBuf::from(work_tree),
    })
  }

  /// Working tree root reported by git
  pub fn work_tree(&self) -> &Path {
    &self.work_tree
  }

  /// Get HEAD commit SHA
  pub fn head_commit(&self) -> ReleaseResult<String> {
    let output = self
      .git_cmd()
      .args(["rev-parse", "HEAD"])
      .output()
      .context("Failed to get HEAD commit")?;

    if !output.status.success() {
      return Err(command_failed("git rev-parse HEAD", &output.stderr));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Raw `git log <from>..HEAD` in the medium format
  ///
  /// The caller validates `from` with [`is_valid_commit_ref`] first; this
  /// function only checks that git accepted the range.
  pub fn log_since(&self, from: &str) -> ReleaseResult<String> {
    let range = format!("{}..HEAD", from);
    tracing::debug!(range = %range, repo = %self.repo_path.display(), "reading git log");

    let output = self
      .git_cmd()
      .args(["log", "--no-color", "--pretty=medium", "--no-decorate", &range])
      .output()
      .context("Failed to run git log")?;

    if !output.status.success() {
      return Err(command_failed(&format!("git log {}", range), &output.stderr));
    }

    String::from_utf8(output.stdout)
      .map_err(|e| ReleaseError::message(format!("git log output is not valid UTF-8: {}", e)))
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to repo path
  /// - Clears environment variables
  /// - Whitelists only PATH and HOME
  /// - Adds safe configuration overrides
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&self.repo_path);

    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    // Non-ASCII paths stay readable in error output
    cmd.arg("-c").arg("core.quotePath=false");
    // Keep gpg verification output out of the log the changelog parser reads
    cmd.arg("-c").arg("log.showSignature=false");
    // log_since decodes stdout as UTF-8
    cmd.arg("-c").arg("i18n.logOutputEncoding=UTF-8");

    cmd
  }
}

fn command_failed(command: &str, stderr: &[u8]) -> ReleaseError {
  ReleaseError::message(format!(
    "Git command failed: {}\n{}",
    command,
    String::from_utf8_lossy(stderr).trim_end()
  ))
}

/// Abbreviated or full lowercase hex commit id (9 to 40 chars)
pub fn is_valid_commit_ref(value: &str) -> bool {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN
    .get_or_init(|| Regex::new(r"^[a-f0-9]{9,40}$").expect("commit ref pattern is valid"))
    .is_match(value)
}

/// Reject anything but a plain commit id before it reaches git
pub fn require_commit_ref(value: &str) -> ReleaseResult<()> {
  if is_valid_commit_ref(value) {
    Ok(())
  } else {
    Err(
      ValidationError::InvalidInput {
        what: "last commit".to_string(),
        value: value.to_string(),
      }
      .into(),
    )
  }
}
