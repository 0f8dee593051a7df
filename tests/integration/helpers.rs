//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Date every test release is named after
pub const DATE: &str = "16_10_26";

/// Template with a comment line and both placeholders
pub const TEMPLATE: &str = "// Private, not part of the command\nsend {path}\ncaption: {caption}\n";

/// An application root with git history and an updates.toml
///
/// The build output lives inside the root (`out/Debug`) so nothing escapes the
/// temp dir.
pub struct TestWorkspace {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestWorkspace {
  /// Create a new workspace with one initial commit
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;

    std::fs::write(
      path.join("updates.toml"),
      r#"[build]
out_dir = "out"

[compose]
template = "updates_template.txt"
"#,
    )?;
    std::fs::write(path.join("updates_template.txt"), TEMPLATE)?;
    std::fs::write(path.join(".gitignore"), "out/\n")?;

    git(&path, &["add", "."])?;
    git(&path, &["commit", "-m", "Initial setup"])?;

    Ok(Self { _root: root, path })
  }

  /// Write a file and commit it, returning the new HEAD
  pub fn commit_change(&self, file: &str, content: &str, message: &str) -> Result<String> {
    std::fs::write(self.path.join(file), content)?;
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "-m", message])?;
    self.head()
  }

  pub fn head(&self) -> Result<String> {
    let output = git(&self.path, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// `out/Debug`, where cmake would put the bundle
  pub fn config_dir(&self) -> PathBuf {
    self.path.join("out").join("Debug")
  }

  /// `out/Debug/updates/<DATE>`
  pub fn output_dir(&self) -> PathBuf {
    self.config_dir().join("updates").join(DATE)
  }

  pub fn command_file(&self) -> PathBuf {
    self.output_dir().join("command.txt")
  }

  pub fn final_archive(&self) -> PathBuf {
    self.output_dir().join(format!("tdesktop_macOS_{}.zip", DATE))
  }

  pub fn app_binary(&self) -> PathBuf {
    self.config_dir().join("Telegram.app/Contents/MacOS/Telegram")
  }

  /// Write the command file directly, bypassing compose
  pub fn write_command_file(&self, contents: &str) -> Result<()> {
    std::fs::create_dir_all(self.output_dir())?;
    std::fs::write(self.command_file(), contents)?;
    Ok(())
  }

  /// Append TOML to updates.toml
  pub fn append_config(&self, toml: &str) -> Result<()> {
    let path = self.path.join("updates.toml");
    let mut config = std::fs::read_to_string(&path)?;
    config.push_str(toml);
    std::fs::write(path, config)?;
    Ok(())
  }

  /// Built app bundle with the binary in place
  pub fn make_bundle(&self) -> Result<()> {
    let binary = self.app_binary();
    std::fs::create_dir_all(binary.parent().context("binary has a parent")?)?;
    std::fs::write(binary, "binary")?;
    Ok(())
  }

  /// Executable scripts in a `bin` folder, returned as a PATH value that
  /// puts them before the system tools
  #[cfg(unix)]
  pub fn install_tools(&self, tools: &[(&str, &str)]) -> Result<String> {
    use std::os::unix::fs::PermissionsExt;

    let bin = self.path.join("bin");
    std::fs::create_dir_all(&bin)?;
    for (name, script) in tools {
      let tool = bin.join(name);
      std::fs::write(&tool, script)?;
      std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755))?;
    }

    let system_path = std::env::var("PATH").unwrap_or_default();
    Ok(format!("{}:{}", bin.display(), system_path))
  }

  /// Stand-in app binary that records its arguments next to itself
  #[cfg(unix)]
  pub fn install_fake_app(&self) -> Result<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    let binary = self.app_binary();
    std::fs::create_dir_all(binary.parent().context("binary has a parent")?)?;
    std::fs::write(&binary, "#!/bin/sh\necho \"$@\" > \"$(dirname \"$0\")/sent.txt\"\n")?;
    std::fs::set_permissions(&binary, std::fs::Permissions::from_mode(0o755))?;

    Ok(binary.with_file_name("sent.txt"))
  }

  /// Run desk-updates against this workspace
  pub fn run(&self, args: &[&str]) -> Result<Output> {
    self.run_with_env(args, &[])
  }

  pub fn run_with_env(&self, args: &[&str], env: &[(&str, &str)]) -> Result<Output> {
    let mut all_args = vec!["--root", self.path.to_str().context("utf-8 temp path")?];
    all_args.extend_from_slice(args);
    run_desk_updates(&self.path, &all_args, env)
  }
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run the desk-updates binary
///
/// Returns the output whether or not the command succeeded; tests assert on
/// the exit code themselves. `AC_USERNAME` is removed unless passed in `env`.
pub fn run_desk_updates(cwd: &Path, args: &[&str], env: &[(&str, &str)]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_desk-updates");

  let mut command = Command::new(bin);
  command.current_dir(cwd).args(args).env_remove("AC_USERNAME").env_remove("RUST_LOG");
  for (key, value) in env {
    command.env(key, value);
  }

  command.output().context("Failed to run desk-updates")
}

pub fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).into_owned()
}
