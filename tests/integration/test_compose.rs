//! Tests for the `compose` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_compose_writes_command_file() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  let last_release = workspace.head()?;
  workspace.commit_change("a.txt", "a", "Add feature A")?;
  workspace.commit_change("b.txt", "b", "Fix bug B\n\nLonger explanation.")?;

  let output = workspace.run(&["compose", "--from", &last_release, "--date", DATE])?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));

  let command = std::fs::read_to_string(workspace.command_file())?;
  let expected = format!(
    "send {}\ncaption: TDesktop at 16.10.26:\n\n- Add feature A\n- Fix bug B\nLonger explanation.\n",
    workspace.final_archive().display()
  );
  assert_eq!(command, expected);

  let out = stdout(&output);
  assert!(out.contains("Ready! File: tdesktop_macOS_16_10_26.zip"));
  assert!(out.contains(&format!("vi {}", workspace.command_file().display())));

  Ok(())
}

#[test]
fn test_compose_rejects_bad_commit() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  let output = workspace.run(&["compose", "--from", "HEAD~1", "--date", DATE])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("Wrong last commit: HEAD~1"));
  assert!(!workspace.output_dir().exists());

  Ok(())
}

#[test]
fn test_compose_without_new_commits() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  let head = workspace.head()?;

  let output = workspace.run(&["compose", "--from", &head, "--date", DATE])?;
  assert_eq!(output.status.code(), Some(3));
  assert!(stderr(&output).contains("No commits since last build"));
  assert!(!workspace.command_file().exists());

  Ok(())
}

#[test]
fn test_compose_requires_template() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  let last_release = workspace.head()?;
  workspace.commit_change("a.txt", "a", "Add feature A")?;
  std::fs::remove_file(workspace.path.join("updates_template.txt"))?;

  let output = workspace.run(&["compose", "--from", &last_release, "--date", DATE])?;
  assert!(!output.status.success());
  assert!(stderr(&output).contains("Template file not found"));

  Ok(())
}

#[test]
fn test_compose_overwrites_previous_command_file() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  let last_release = workspace.head()?;
  workspace.commit_change("a.txt", "a", "Add feature A")?;
  workspace.write_command_file("caption: stale\n")?;

  let output = workspace.run(&["compose", "--from", &last_release, "--date", DATE])?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));

  let command = std::fs::read_to_string(workspace.command_file())?;
  assert!(!command.contains("stale"));
  assert!(command.contains("- Add feature A"));

  Ok(())
}
