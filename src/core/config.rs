use crate::core::error::{ConfigError, ReleaseError, ReleaseResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for desk-updates
/// Searched in order: updates.toml, .updates.toml, .config/updates.toml
///
/// Every section is optional. A root without any config file runs with the
/// defaults below, which describe the macOS debug pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdatesConfig {
  pub app: AppConfig,
  pub build: BuildConfig,
  pub signing: SigningConfig,
  pub notary: NotaryConfig,
  pub compose: ComposeConfig,
  pub send: SendConfig,
}

/// What is being released
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  /// Bundle and executable name (`<name>.app/Contents/MacOS/<name>`)
  pub name: String,

  /// Bundle identifier sent to the notarization service
  pub bundle_id: String,

  /// Archive file name prefix (`<prefix>_<date>.zip`)
  pub archive_prefix: String,

  /// First word of the release caption (`<prefix> at <date>:`)
  pub caption_prefix: String,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      name: "Telegram".to_string(),
      bundle_id: "com.tdesktop.TelegramDebug".to_string(),
      archive_prefix: "tdesktop_macOS".to_string(),
      caption_prefix: "TDesktop".to_string(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
  /// Build tree, relative to the root
  pub out_dir: PathBuf,

  /// CMake configuration, also the folder name inside `out_dir`
  pub configuration: String,

  /// Project generation command, run in the root
  pub configure: Vec<String>,

  /// Empty folder shipped next to the app in the archive
  pub portable_marker: String,

  /// Paths inside the signed bundle that must exist before packaging
  pub required_files: Vec<PathBuf>,
}

impl Default for BuildConfig {
  fn default() -> Self {
    Self {
      out_dir: PathBuf::from("../out"),
      configuration: "Debug".to_string(),
      configure: vec!["./configure.sh".to_string()],
      portable_marker: "TelegramForcePortable".to_string(),
      required_files: vec![
        PathBuf::from("Contents/Frameworks/Updater"),
        PathBuf::from("Contents/Helpers/crashpad_handler"),
        PathBuf::from("Contents/Resources/Icon.icns"),
        PathBuf::from("Contents/_CodeSignature"),
      ],
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningConfig {
  /// Keychain identity passed to `codesign --sign`
  pub identity: String,

  /// Entitlements plist, relative to the root
  pub entitlements: PathBuf,
}

impl Default for SigningConfig {
  fn default() -> Self {
    Self {
      identity: "Developer ID Application: John Preston".to_string(),
      entitlements: PathBuf::from("Telegram/Telegram.entitlements"),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotaryConfig {
  /// Environment variable holding the notarization account
  pub username_env: String,

  /// Password argument for altool (keychain reference, never a literal secret)
  pub password: String,

  /// Delay before every status query
  pub poll_interval_secs: u64,

  /// Give up polling after this long
  pub poll_timeout_secs: u64,
}

impl Default for NotaryConfig {
  fn default() -> Self {
    Self {
      username_env: "AC_USERNAME".to_string(),
      password: "@keychain:AC_PASSWORD".to_string(),
      poll_interval_secs: 5,
      poll_timeout_secs: 7200,
    }
  }
}

impl NotaryConfig {
  pub fn poll_interval(&self) -> Duration {
    Duration::from_secs(self.poll_interval_secs)
  }

  pub fn poll_timeout(&self) -> Duration {
    Duration::from_secs(self.poll_timeout_secs)
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
  /// Command file template, relative to the root
  pub template: PathBuf,
}

impl Default for ComposeConfig {
  fn default() -> Self {
    Self {
      template: PathBuf::from("../../DesktopPrivate/updates_template.txt"),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SendConfig {
  /// Maximum caption length in characters
  pub caption_limit: usize,
}

impl Default for SendConfig {
  fn default() -> Self {
    Self { caption_limit: 1024 }
  }
}

impl UpdatesConfig {
  /// Find config file in search order: updates.toml, .updates.toml, .config/updates.toml
  pub fn find_config_path(root: &Path) -> Option<PathBuf> {
    let candidates = [
      root.join("updates.toml"),
      root.join(".updates.toml"),
      root.join(".config").join("updates.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config for a root
  ///
  /// An explicit path must exist. Without one, the search order above is
  /// tried and the defaults are used when nothing is found.
  pub fn load(root: &Path, explicit: Option<&Path>) -> ReleaseResult<Self> {
    let config_path = match explicit {
      Some(path) => {
        if !path.exists() {
          return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
          }
          .into());
        }
        path.to_path_buf()
      }
      None => match Self::find_config_path(root) {
        Some(path) => path,
        None => {
          tracing::debug!(root = %root.display(), "no config file, using defaults");
          return Ok(Self::default());
        }
      },
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config = Self::parse(&content).with_context(|| format!("Invalid config in {}", config_path.display()))?;
    tracing::debug!(path = %config_path.display(), "loaded config");

    Ok(config)
  }

  /// Parse and validate config text
  pub fn parse(content: &str) -> ReleaseResult<Self> {
    let config: UpdatesConfig = toml_edit::de::from_str(content)?;
    config.validate()?;
    Ok(config)
  }

  /// Reject values the pipeline cannot run with
  pub fn validate(&self) -> ReleaseResult<()> {
    let non_empty = [
      ("app.name", &self.app.name),
      ("app.bundle_id", &self.app.bundle_id),
      ("app.archive_prefix", &self.app.archive_prefix),
      ("app.caption_prefix", &self.app.caption_prefix),
      ("build.configuration", &self.build.configuration),
      ("signing.identity", &self.signing.identity),
      ("notary.username_env", &self.notary.username_env),
    ];
    for (field, value) in non_empty {
      if value.trim().is_empty() {
        return Err(invalid(field, "must not be empty"));
      }
    }

    if self.build.configure.first().is_none_or(|program| program.trim().is_empty()) {
      return Err(invalid("build.configure", "needs at least a program to run"));
    }

    if self.notary.poll_interval_secs == 0 {
      return Err(invalid("notary.poll_interval_secs", "must be at least 1"));
    }

    if self.notary.poll_timeout_secs < self.notary.poll_interval_secs {
      return Err(invalid(
        "notary.poll_timeout_secs",
        "must not be shorter than notary.poll_interval_secs",
      ));
    }

    if self.send.caption_limit == 0 {
      return Err(invalid("send.caption_limit", "must be at least 1"));
    }

    Ok(())
  }
}

fn invalid(field: &str, reason: &str) -> ReleaseError {
  ReleaseError::Config(ConfigError::InvalidField {
    field: field.to_string(),
    reason: reason.to_string(),
  })
}
