//! `desk-updates send`: hand the command file to the built app

use crate::core::context::ReleaseContext;
use crate::core::error::{ReleaseResult, ResultExt, ValidationError};
use crate::core::process::ExternalCommand;
use crate::release::Caption;
use std::fs;

/// Run the send command
pub fn run_send(ctx: &ReleaseContext) -> ReleaseResult<()> {
  let command_file = ctx.command_file();
  if !command_file.exists() {
    return Err(
      ValidationError::MissingFile {
        what: "Command file".to_string(),
        path: command_file,
      }
      .into(),
    );
  }

  let contents =
    fs::read_to_string(&command_file).with_context(|| format!("Failed to read {}", command_file.display()))?;
  let caption = Caption::extract(&contents, &command_file)?;
  caption.require_header(&ctx.caption_header())?;

  println!();
  println!("🚀 Sending! File: {}", ctx.archive_name());
  println!("Changelog:");
  println!("{}", caption.as_str().trim_end());

  let limit = ctx.config.send.caption_limit;
  if !caption.fits(limit) {
    println!("   Length: {}", caption.char_count());
    println!("vi {}", command_file.display());
    return Err(
      ValidationError::CaptionTooLarge {
        length: caption.char_count(),
        limit,
      }
      .into(),
    );
  }

  let archive = ctx.final_archive();
  if !archive.exists() {
    return Err(
      ValidationError::MissingFile {
        what: "Archive (not built yet)".to_string(),
        path: archive,
      }
      .into(),
    );
  }

  let target = format!("interpret://{}", command_file.display());
  ExternalCommand::new(ctx.app_binary())
    .args(["-sendpath", &target])
    .run(&format!("While sending through {}.", ctx.config.app.name))?;

  println!("✅ Sent.");
  Ok(())
}
