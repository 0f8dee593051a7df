//! Tests for the `build` command
//!
//! A fresh build needs the macOS toolchain. The resumed path is driven with
//! shell stand-ins for `xcrun`, `zip` and `curl` placed first on PATH.

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_build_requires_account() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  let output = workspace.run(&["build", "--date", DATE])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("AC_USERNAME not found!"));
  assert!(!workspace.config_dir().exists());

  Ok(())
}

#[test]
fn test_build_refuses_existing_release() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  std::fs::create_dir_all(workspace.output_dir())?;
  std::fs::write(workspace.final_archive(), b"zip")?;

  let output = workspace.run_with_env(&["build", "--date", DATE], &[("AC_USERNAME", "dev@example.com")])?;
  assert_eq!(output.status.code(), Some(3));
  assert!(stderr(&output).contains("Today's updates version exists"));

  Ok(())
}

#[test]
fn test_build_rejects_unsafe_date() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  let output = workspace.run_with_env(&["build", "--date", "../x"], &[("AC_USERNAME", "dev@example.com")])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("Wrong date: ../x"));

  Ok(())
}

#[test]
fn test_build_rejects_invalid_config() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  std::fs::write(workspace.path.join("updates.toml"), "[send]\ncaption_limit = 0\n")?;

  let output = workspace.run_with_env(&["build", "--date", DATE], &[("AC_USERNAME", "dev@example.com")])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("send.caption_limit"));

  Ok(())
}

#[test]
fn test_build_runs_after_compose() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  let last_release = workspace.head()?;
  workspace.commit_change("a.txt", "a", "Add feature A")?;

  let composed = workspace.run(&["compose", "--from", &last_release, "--date", DATE])?;
  assert!(composed.status.success(), "stderr: {}", stderr(&composed));
  assert!(workspace.command_file().exists());

  // The composed command file must not count as a published release; the
  // build goes on to the configure step, which has no script here
  let output = workspace.run_with_env(&["build", "--date", DATE], &[("AC_USERNAME", "dev@example.com")])?;
  let err = stderr(&output);
  assert_eq!(output.status.code(), Some(2), "stderr: {}", err);
  assert!(!err.contains("Today's updates version exists"));
  assert!(err.contains("While calling GYP."));
  assert!(workspace.command_file().exists());

  Ok(())
}

#[cfg(unix)]
const XCRUN: &str = r#"#!/bin/sh
case "$1" in
  altool)
    echo "RequestUUID: $3"
    echo "     Status: success"
    echo " LogFileURL: https://example.com/log.json"
    ;;
  stapler)
    touch "$3/Contents/Stapled"
    ;;
esac
"#;

/// Lists what would be archived: `zip -r <archive> <dir>`
#[cfg(unix)]
const ZIP: &str = "#!/bin/sh\nls -R \"$3\" > \"$2\"\n";

#[cfg(unix)]
const CURL: &str = "#!/bin/sh\necho '{\"issues\": [{\"path\": \"Telegram.app/Contents/MacOS/Telegram\"}]}'\n";

#[cfg(unix)]
#[test]
fn test_resumed_build_publishes_stapled_archive() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.append_config("\n[notary]\npoll_interval_secs = 1\npoll_timeout_secs = 30\n")?;
  workspace.make_bundle()?;
  let path = workspace.install_tools(&[("xcrun", XCRUN), ("zip", ZIP), ("curl", CURL)])?;

  // Left over from the submitted archive
  let staging = workspace.config_dir().join(DATE);
  std::fs::create_dir_all(staging.join("Telegram.app"))?;
  std::fs::write(staging.join("Telegram.app/unstapled"), "old")?;
  let work_archive = workspace.config_dir().join(format!("tdesktop_macOS_{}.zip", DATE));
  std::fs::write(&work_archive, "submitted")?;

  let output = workspace.run_with_env(
    &["build", "--date", DATE, "--request-uuid", "1234-abcd"],
    &[("AC_USERNAME", "dev@example.com"), ("PATH", &path)],
  )?;
  let out = stdout(&output);
  assert!(output.status.success(), "stdout: {}\nstderr: {}", out, stderr(&output));

  assert!(out.contains("Continue with request UUID: 1234-abcd"));
  assert!(out.contains("Status: success"));
  assert!(out.contains("Re-Archived."));
  assert!(out.contains("Finished."));
  assert!(out.contains("SHA-256: "));
  assert!(out.contains("NB! Notarization log issues:"));

  // Restaged from the stapled bundle, with the portable marker
  let archived = std::fs::read_to_string(workspace.final_archive())?;
  assert!(archived.contains("Stapled"));
  assert!(archived.contains("TelegramForcePortable"));
  assert!(!archived.contains("unstapled"));

  assert!(!staging.exists());
  assert!(!work_archive.exists());

  Ok(())
}
