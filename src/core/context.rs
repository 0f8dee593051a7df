//! Release context - resolve once, pass everywhere
//!
//! `ReleaseContext` ties the root directory, the loaded configuration and the
//! release date together and derives every path the commands touch:
//!
//! ```text
//! <root>/<out_dir>/<configuration>/            config dir (cmake output)
//!   <App>.app                                  signed bundle
//!   <date>/                                    staging dir, archive root
//!   updates/<date>/<prefix>_<date>.zip         final archive
//!   updates/<date>/command.txt                 rendered send command
//! ```

use crate::core::config::UpdatesConfig;
use crate::core::error::{ReleaseResult, ValidationError};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Name of one release, `DD_MM_YY` by default
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseDate(String);

impl ReleaseDate {
  /// Today in local time
  pub fn today() -> Self {
    Self(chrono::Local::now().format("%d_%m_%y").to_string())
  }

  /// Accept a user-supplied date
  ///
  /// The date becomes a directory and archive name, so only ASCII
  /// alphanumerics and `_`, `-`, `.` are allowed.
  pub fn parse(value: &str) -> ReleaseResult<Self> {
    let valid = !value.is_empty()
      && value != "."
      && value != ".."
      && value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

    if !valid {
      return Err(
        ValidationError::InvalidInput {
          what: "date".to_string(),
          value: value.to_string(),
        }
        .into(),
      );
    }

    Ok(Self(value.to_string()))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Human form used in captions (`16_10_26` -> `16.10.26`)
  pub fn dotted(&self) -> String {
    self.0.replace('_', ".")
  }
}

impl fmt::Display for ReleaseDate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Everything a command needs to locate the release on disk
#[derive(Clone)]
pub struct ReleaseContext {
  /// Application source directory (absolute path)
  pub root: PathBuf,

  /// Loaded or default configuration
  pub config: Arc<UpdatesConfig>,

  /// Release being built, composed or sent
  pub date: ReleaseDate,
}

impl ReleaseContext {
  pub fn new(root: PathBuf, config: UpdatesConfig, date: ReleaseDate) -> Self {
    Self {
      root,
      config: Arc::new(config),
      date,
    }
  }

  /// CMake build tree
  pub fn out_dir(&self) -> PathBuf {
    self.root.join(&self.config.build.out_dir)
  }

  /// Per-configuration output folder (`out/Debug`)
  pub fn config_dir(&self) -> PathBuf {
    self.out_dir().join(&self.config.build.configuration)
  }

  pub fn app_bundle(&self) -> PathBuf {
    self.config_dir().join(self.app_bundle_name())
  }

  pub fn app_bundle_name(&self) -> String {
    format!("{}.app", self.config.app.name)
  }

  pub fn app_binary(&self) -> PathBuf {
    self.app_bundle().join("Contents").join("MacOS").join(&self.config.app.name)
  }

  /// Folder that becomes the root of the archive
  pub fn staging_dir(&self) -> PathBuf {
    self.config_dir().join(self.date.as_str())
  }

  pub fn archive_name(&self) -> String {
    format!("{}_{}.zip", self.config.app.archive_prefix, self.date)
  }

  /// Archive location while it is being built and notarized
  pub fn work_archive(&self) -> PathBuf {
    self.config_dir().join(self.archive_name())
  }

  /// `updates/<date>` under the config dir
  pub fn output_dir(&self) -> PathBuf {
    self.config_dir().join("updates").join(self.date.as_str())
  }

  pub fn final_archive(&self) -> PathBuf {
    self.output_dir().join(self.archive_name())
  }

  pub fn command_file(&self) -> PathBuf {
    self.output_dir().join("command.txt")
  }

  pub fn template(&self) -> PathBuf {
    self.root.join(&self.config.compose.template)
  }

  pub fn entitlements(&self) -> PathBuf {
    self.root.join(&self.config.signing.entitlements)
  }

  /// Caption header every release message starts with
  pub fn caption_header(&self) -> String {
    format!("{} at {}:", self.config.app.caption_prefix, self.date.dotted())
  }

  /// Get root as Path reference (convenience)
  pub fn root(&self) -> &Path {
    &self.root
  }
}
