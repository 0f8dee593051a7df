//! Tests for the `send` command

use crate::helpers::*;
use anyhow::Result;

const COMMAND: &str = "send archive\ncaption: TDesktop at 16.10.26:\n\n- Add feature A\n";

#[test]
fn test_send_requires_command_file() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  let output = workspace.run(&["send", "--date", DATE])?;
  assert_eq!(output.status.code(), Some(3));
  assert!(stderr(&output).contains("Command file not found"));

  Ok(())
}

#[test]
fn test_send_rejects_wrong_caption_start() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.write_command_file("caption: TDesktop at 01.01.26:\n\n- Old\n")?;

  let output = workspace.run(&["send", "--date", DATE])?;
  assert!(!output.status.success());
  assert!(stderr(&output).contains("Wrong caption start, expected 'TDesktop at 16.10.26:'"));

  Ok(())
}

#[test]
fn test_send_rejects_missing_caption() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.write_command_file("send archive\n")?;

  let output = workspace.run(&["send", "--date", DATE])?;
  assert!(!output.status.success());
  assert!(stderr(&output).contains("Caption not found"));

  Ok(())
}

#[test]
fn test_send_rejects_large_caption() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  let long_line = "x".repeat(1100);
  workspace.write_command_file(&format!("caption: TDesktop at 16.10.26:\n\n- {}\n", long_line))?;

  let output = workspace.run(&["send", "--date", DATE])?;
  assert_eq!(output.status.code(), Some(3));
  assert!(stderr(&output).contains("Too large."));
  assert!(stdout(&output).contains(&format!("vi {}", workspace.command_file().display())));

  Ok(())
}

#[test]
fn test_send_requires_built_archive() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.write_command_file(COMMAND)?;

  let output = workspace.run(&["send", "--date", DATE])?;
  assert!(!output.status.success());
  assert!(stderr(&output).contains("not built yet"));

  Ok(())
}

#[cfg(unix)]
#[test]
fn test_send_runs_app_with_command_file() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.write_command_file(COMMAND)?;
  std::fs::write(workspace.final_archive(), b"zip")?;
  let sent = workspace.install_fake_app()?;

  let output = workspace.run(&["send", "--date", DATE])?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));
  assert!(stdout(&output).contains("Sending! File: tdesktop_macOS_16_10_26.zip"));

  let args = std::fs::read_to_string(sent)?;
  assert_eq!(
    args.trim_end(),
    format!("-sendpath interpret://{}", workspace.command_file().display())
  );

  Ok(())
}

#[cfg(unix)]
#[test]
fn test_send_reports_app_failure() -> Result<()> {
  use std::os::unix::fs::PermissionsExt;

  let workspace = TestWorkspace::new()?;
  workspace.write_command_file(COMMAND)?;
  std::fs::write(workspace.final_archive(), b"zip")?;
  workspace.install_fake_app()?;
  std::fs::write(workspace.app_binary(), "#!/bin/sh\nexit 4\n")?;
  std::fs::set_permissions(workspace.app_binary(), std::fs::Permissions::from_mode(0o755))?;

  let output = workspace.run(&["send", "--date", DATE])?;
  assert_eq!(output.status.code(), Some(2));

  Ok(())
}
