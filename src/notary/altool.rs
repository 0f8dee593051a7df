//! `xcrun altool` backed notarization service

use super::NotaryService;
use crate::core::config::NotaryConfig;
use crate::core::error::ReleaseResult;
use crate::core::process::ExternalCommand;
use std::path::{Path, PathBuf};

/// Talks to the notarization service through `xcrun altool`
pub struct Altool {
  bundle_id: String,
  username: String,
  password: String,
  /// Directory the archive is submitted from
  work_dir: PathBuf,
}

impl Altool {
  pub fn new(bundle_id: &str, username: &str, config: &NotaryConfig, work_dir: &Path) -> Self {
    Self {
      bundle_id: bundle_id.to_string(),
      username: username.to_string(),
      password: config.password.clone(),
      work_dir: work_dir.to_path_buf(),
    }
  }

  fn altool(&self) -> ExternalCommand {
    ExternalCommand::new("xcrun").arg("altool").current_dir(&self.work_dir)
  }

  fn credentials(&self) -> [&str; 4] {
    ["--username", &self.username, "--password", &self.password]
  }
}

impl NotaryService for Altool {
  fn submit(&self, archive: &Path) -> ReleaseResult<String> {
    self
      .altool()
      .args(["--notarize-app", "--primary-bundle-id", &self.bundle_id])
      .args(self.credentials())
      .arg("--file")
      .arg(archive)
      .capture("While submitting for notarization.")
  }

  fn info(&self, request_uuid: &str) -> ReleaseResult<String> {
    self
      .altool()
      .args(["--notarization-info", request_uuid])
      .args(self.credentials())
      .capture("While checking notarization status.")
  }

  fn fetch_log(&self, url: &str) -> ReleaseResult<String> {
    ExternalCommand::new("curl")
      .args(["--silent", "--show-error", "--fail", "--location", url])
      .capture(&format!("Error calling curl {}", url))
  }
}
