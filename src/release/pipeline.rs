//! Build pipeline steps: compile, sign, verify, stage, archive, publish
//!
//! Each step is a thin wrapper over an external tool or a filesystem move.
//! Steps are individually callable so `commands::build` can skip the ones a
//! resumed notarization does not need.

use crate::core::context::ReleaseContext;
use crate::core::error::{ReleaseError, ReleaseResult, ResultExt, ValidationError};
use crate::core::process::ExternalCommand;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub struct BuildPipeline<'a> {
  ctx: &'a ReleaseContext,
}

impl<'a> BuildPipeline<'a> {
  pub fn new(ctx: &'a ReleaseContext) -> Self {
    Self { ctx }
  }

  fn app_name(&self) -> &str {
    &self.ctx.config.app.name
  }

  /// Refuse to overwrite a published release
  ///
  /// Only the published archive counts. `compose` may already have written the
  /// command file into `updates/<date>`.
  pub fn ensure_not_built(&self) -> ReleaseResult<()> {
    let archive = self.ctx.final_archive();
    if archive.exists() {
      return Err(ValidationError::AlreadyBuilt { path: archive }.into());
    }
    Ok(())
  }

  /// Regenerate the project files
  pub fn configure(&self) -> ReleaseResult<()> {
    let argv = &self.ctx.config.build.configure;
    let command = ExternalCommand::from_argv(argv)
      .ok_or_else(|| ReleaseError::message("No configure command set in [build].configure"))?;
    command.current_dir(self.ctx.root()).run("While calling GYP.")
  }

  pub fn compile(&self) -> ReleaseResult<()> {
    ExternalCommand::new("cmake")
      .args(["--build", ".", "--config", &self.ctx.config.build.configuration])
      .args(["--target", self.app_name()])
      .current_dir(self.ctx.out_dir())
      .run(&format!("While building {}.", self.app_name()))
  }

  pub fn require_bundle(&self) -> ReleaseResult<()> {
    let bundle = self.ctx.app_bundle();
    if !bundle.exists() {
      return Err(missing(&self.ctx.app_bundle_name(), bundle));
    }
    Ok(())
  }

  pub fn strip(&self) -> ReleaseResult<()> {
    ExternalCommand::new("strip")
      .arg(self.ctx.app_binary())
      .run(&format!("While stripping {}.", self.app_name()))
  }

  /// Hardened-runtime deep signature with a secure timestamp
  pub fn sign(&self) -> ReleaseResult<()> {
    ExternalCommand::new("codesign")
      .args(["--force", "--deep", "--timestamp", "--options", "runtime"])
      .args(["--sign", &self.ctx.config.signing.identity])
      .arg(self.ctx.app_bundle())
      .arg("--entitlements")
      .arg(self.ctx.entitlements())
      .current_dir(self.ctx.config_dir())
      .run(&format!("While signing {}.", self.app_name()))
  }

  /// Check that every required file made it into the signed bundle
  pub fn verify_bundle(&self) -> ReleaseResult<()> {
    let bundle = self.ctx.app_bundle();
    for relative in &self.ctx.config.build.required_files {
      let path = bundle.join(relative);
      if !path.exists() {
        let what = relative
          .file_name()
          .map(|n| n.to_string_lossy().into_owned())
          .unwrap_or_else(|| relative.display().to_string());
        return Err(missing(&what, path));
      }
    }
    Ok(())
  }

  /// Fresh staging folder with the portable marker and a copy of the bundle
  pub fn stage(&self) -> ReleaseResult<()> {
    let staging = self.ctx.staging_dir();
    if staging.exists() {
      fs::remove_dir_all(&staging).with_context(|| format!("Failed to clear {}", staging.display()))?;
    }
    self.ensure_marker()?;
    self.copy_bundle("Cloning")
  }

  /// Zip the staging folder into the work archive
  pub fn pack(&self) -> ReleaseResult<PathBuf> {
    ExternalCommand::new("zip")
      .args(["-r", &self.ctx.archive_name(), self.ctx.date.as_str()])
      .current_dir(self.ctx.config_dir())
      .run(&format!("Adding {} to archive.", self.app_name()))?;
    Ok(self.ctx.work_archive())
  }

  /// Attach the notarization ticket to the bundle
  pub fn staple(&self) -> ReleaseResult<()> {
    ExternalCommand::new("xcrun")
      .args(["stapler", "staple"])
      .arg(self.ctx.app_bundle())
      .run("Error calling stapler")
  }

  /// Replace the staged bundle with the stapled one and archive again
  pub fn restage(&self) -> ReleaseResult<PathBuf> {
    self.restage_bundle()?;
    let archive = self.pack()?;
    println!("   Re-Archived.");
    Ok(archive)
  }

  /// Drop the pre-staple bundle and archive, copy the stapled bundle in
  fn restage_bundle(&self) -> ReleaseResult<()> {
    let staged = self.ctx.staging_dir().join(self.ctx.app_bundle_name());
    remove_if_exists(&staged)?;
    remove_if_exists(&self.ctx.work_archive())?;

    self.ensure_marker()?;
    self.copy_bundle("Re-Cloning")
  }

  /// Move the archive into `updates/<date>` and drop the staging folder
  pub fn publish(&self) -> ReleaseResult<PathBuf> {
    let output = self.ctx.output_dir();
    fs::create_dir_all(&output).with_context(|| format!("Failed to create {}", output.display()))?;

    let target = self.ctx.final_archive();
    fs::rename(self.ctx.work_archive(), &target)
      .with_context(|| format!("Failed to move archive to {}", target.display()))?;

    remove_if_exists(&self.ctx.staging_dir())?;
    Ok(target)
  }

  fn ensure_marker(&self) -> ReleaseResult<()> {
    let marker = self.ctx.staging_dir().join(&self.ctx.config.build.portable_marker);
    fs::create_dir_all(&marker).with_context(|| format!("Failed to create {}", marker.display()))
  }

  fn copy_bundle(&self, verb: &str) -> ReleaseResult<()> {
    let staging = self.ctx.staging_dir();
    ExternalCommand::new("cp")
      .arg("-R")
      .arg(self.ctx.app_bundle())
      .arg(&staging)
      .run(&format!(
        "{} {} to {}.",
        verb,
        self.ctx.app_bundle_name(),
        self.ctx.date
      ))
  }
}

fn missing(what: &str, path: PathBuf) -> ReleaseError {
  ValidationError::MissingFile {
    what: what.to_string(),
    path,
  }
  .into()
}

fn remove_if_exists(path: &Path) -> ReleaseResult<()> {
  let result = if path.is_dir() {
    fs::remove_dir_all(path)
  } else {
    fs::remove_file(path)
  };

  match result {
    Ok(()) => Ok(()),
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
    Err(e) => Err(ReleaseError::from(e).context(format!("Failed to remove {}", path.display()))),
  }
}

/// SHA-256 of a file, lowercase hex
pub fn archive_digest(path: &Path) -> ReleaseResult<String> {
  let mut file = fs::File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
  let mut hasher = Sha256::new();
  io::copy(&mut file, &mut hasher).with_context(|| format!("Failed to read {}", path.display()))?;
  Ok(format!("{:x}", hasher.finalize()))
}
