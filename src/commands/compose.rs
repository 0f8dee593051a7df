//! `desk-updates compose`: changelog since the last build into the command file

use crate::core::context::ReleaseContext;
use crate::core::error::{ReleaseResult, ResultExt, ValidationError};
use crate::core::vcs::{SystemGit, require_commit_ref};
use crate::release::{Changelog, template};
use std::fs;

/// Run the compose command
pub fn run_compose(ctx: &ReleaseContext, from: &str) -> ReleaseResult<()> {
  let template_path = ctx.template();
  if !template_path.exists() {
    return Err(
      ValidationError::MissingFile {
        what: "Template file".to_string(),
        path: template_path,
      }
      .into(),
    );
  }

  require_commit_ref(from)?;

  let git = SystemGit::open(ctx.root())?;
  tracing::debug!(work_tree = %git.work_tree().display(), "composing changelog");
  let log = git.log_since(from)?;
  let changelog = Changelog::parse_non_empty(&log, from)?;
  for entry in changelog.entries() {
    tracing::debug!(sha = %entry.sha, "changelog entry");
  }
  let changelog_text = changelog.render();

  println!();
  println!("📝 Ready! File: {}", ctx.archive_name());
  println!("   Commits: {} ({}..{})", changelog.len(), from, git.head_commit()?);
  println!("Changelog:");
  println!("{}", changelog_text);

  let template_text = fs::read_to_string(&template_path)
    .with_context(|| format!("Failed to read template {}", template_path.display()))?;
  let caption = template::caption(&ctx.caption_header(), &changelog_text);
  let rendered = template::render(&template_text, &ctx.final_archive(), &caption);

  let output_dir = ctx.output_dir();
  fs::create_dir_all(&output_dir).with_context(|| format!("Failed to create {}", output_dir.display()))?;
  let command_file = ctx.command_file();
  fs::write(&command_file, rendered).with_context(|| format!("Failed to write {}", command_file.display()))?;

  println!();
  println!("✏️  Edit:");
  println!();
  println!("vi {}", command_file.display());

  Ok(())
}
