//! Tests for the `status` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_status_of_fresh_date() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  let output = workspace.run(&["status", "--date", DATE, "--json"])?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));

  let status: serde_json::Value = serde_json::from_str(&stdout(&output))?;
  assert_eq!(status["date"], DATE);
  assert_eq!(status["app_bundle"], false);
  assert!(status["archive"].is_null());
  assert!(status["caption"].is_null());

  Ok(())
}

#[test]
fn test_status_after_compose() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  let last_release = workspace.head()?;
  workspace.commit_change("a.txt", "a", "Add feature A")?;

  let composed = workspace.run(&["compose", "--from", &last_release, "--date", DATE])?;
  assert!(composed.status.success(), "stderr: {}", stderr(&composed));

  let output = workspace.run(&["status", "--date", DATE, "--json"])?;
  let status: serde_json::Value = serde_json::from_str(&stdout(&output))?;
  assert_eq!(status["command_file"], true);
  assert_eq!(status["caption"]["header_ok"], true);
  assert_eq!(status["caption"]["limit"], 1024);

  let human = workspace.run(&["status", "--date", DATE])?;
  assert!(stdout(&human).contains("Release 16.10.26"));

  Ok(())
}
