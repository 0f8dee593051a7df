//! Changelog generation from `git log` output
//!
//! Parses the default (medium) `git log` format:
//!
//! ```text
//! commit 3f2a9c1e...
//! Author: Someone <someone@example.com>
//! Date:   Thu Oct 15 12:00:00 2026 +0300
//!
//!     Fix crash in media viewer.
//!
//!     Longer explanation.
//! ```
//!
//! Each commit becomes one bullet. The first message line gets the `- ` marker,
//! following non-blank lines are kept below it unchanged.

use crate::core::error::{ReleaseResult, ValidationError};

/// One commit's contribution to the changelog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
  /// Full commit SHA from the `commit` header
  pub sha: String,
  /// Rendered text (`- first line\nsecond line...`), empty if the commit had no message
  pub text: String,
}

/// Changelog for the commits since the last build, oldest first
#[derive(Debug, Clone)]
pub struct Changelog {
  entries: Vec<ChangelogEntry>,
}

impl Changelog {
  /// Parse raw `git log` output
  ///
  /// Message text before the first `commit` header means the output is not in
  /// the expected format; the raw log is attached to the error.
  pub fn parse(log: &str) -> ReleaseResult<Self> {
    // git prints newest first
    let mut newest_first: Vec<ChangelogEntry> = Vec::new();

    for line in log.lines() {
      if let Some(header) = line.strip_prefix("commit ") {
        let sha = header.split(' ').next().unwrap_or_default().to_string();
        newest_first.push(ChangelogEntry {
          sha,
          text: String::new(),
        });
      } else if let Some(message) = line.strip_prefix("    ") {
        if message.is_empty() {
          continue;
        }
        let Some(entry) = newest_first.last_mut() else {
          return Err(ValidationError::BadGitLog { log: log.to_string() }.into());
        };
        if entry.text.is_empty() {
          entry.text = format!("- {}", message);
        } else {
          entry.text.push('\n');
          entry.text.push_str(message);
        }
      }
    }

    newest_first.reverse();
    Ok(Self { entries: newest_first })
  }

  /// Parse and require at least one commit with a message
  ///
  /// Commits without message text render to nothing, so a range made only of
  /// those counts as empty.
  pub fn parse_non_empty(log: &str, since: &str) -> ReleaseResult<Self> {
    let changelog = Self::parse(log)?;
    if changelog.is_empty() || changelog.entries.iter().all(|e| e.text.is_empty()) {
      return Err(
        ValidationError::NoCommits {
          since: since.to_string(),
        }
        .into(),
      );
    }
    Ok(changelog)
  }

  pub fn entries(&self) -> &[ChangelogEntry] {
    &self.entries
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Bullets joined by newlines, oldest first
  pub fn render(&self) -> String {
    self
      .entries
      .iter()
      .filter(|e| !e.text.is_empty())
      .map(|e| e.text.as_str())
      .collect::<Vec<_>>()
      .join("\n")
  }
}
