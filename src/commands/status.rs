//! `desk-updates status`: how far the release for a date has progressed

use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use crate::core::context::ReleaseContext;
use crate::core::error::{ReleaseError, ReleaseResult, ResultExt};
use crate::release::{Caption, archive_digest};

/// Published archive of a release
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveStatus {
  pub path: PathBuf,
  pub size: u64,
  pub sha256: String,
}

/// Caption found in the command file
#[derive(Debug, Clone, Serialize)]
pub struct CaptionStatus {
  /// Length in characters
  pub length: usize,
  pub limit: usize,
  /// Whether the caption starts with the expected header
  pub header_ok: bool,
}

/// How far the release for one date has progressed
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseStatus {
  pub date: String,
  pub app_bundle: bool,
  pub staging: bool,
  pub archive: Option<ArchiveStatus>,
  pub command_file: bool,
  pub caption: Option<CaptionStatus>,
}

impl ReleaseStatus {
  /// Inspect the filesystem for `ctx.date`
  pub fn collect(ctx: &ReleaseContext) -> ReleaseResult<Self> {
    let final_archive = ctx.final_archive();
    let archive = if final_archive.is_file() {
      let size = fs::metadata(&final_archive)
        .with_context(|| format!("Failed to stat {}", final_archive.display()))?
        .len();
      Some(ArchiveStatus {
        sha256: archive_digest(&final_archive)?,
        path: final_archive,
        size,
      })
    } else {
      None
    };

    let command_file = ctx.command_file();
    let caption = if command_file.is_file() {
      let contents =
        fs::read_to_string(&command_file).with_context(|| format!("Failed to read {}", command_file.display()))?;
      // A command file without a caption line is reported, not fatal
      Caption::extract(&contents, &command_file).ok().map(|caption| CaptionStatus {
        length: caption.char_count(),
        limit: ctx.config.send.caption_limit,
        header_ok: caption.require_header(&ctx.caption_header()).is_ok(),
      })
    } else {
      None
    };

    Ok(Self {
      date: ctx.date.to_string(),
      app_bundle: ctx.app_bundle().exists(),
      staging: ctx.staging_dir().exists(),
      archive,
      command_file: command_file.is_file(),
      caption,
    })
  }
}

/// Run the status command
pub fn run_status(ctx: &ReleaseContext, json: bool) -> ReleaseResult<()> {
  let status = ReleaseStatus::collect(ctx)?;

  if json {
    println!(
      "{}",
      serde_json::to_string_pretty(&status)
        .map_err(|e| ReleaseError::message(format!("Serialization error: {}", e)))?
    );
  } else {
    print_status(ctx, &status);
  }

  Ok(())
}

fn mark(present: bool) -> &'static str {
  if present { "✅" } else { "⬜" }
}

fn print_status(ctx: &ReleaseContext, status: &ReleaseStatus) {
  println!("\n📊 Release {} ({})\n", ctx.date.dotted(), ctx.config.build.configuration);

  println!("{} App bundle      {}", mark(status.app_bundle), ctx.app_bundle().display());
  if status.staging {
    println!("⚠️  Staging left   {}", ctx.staging_dir().display());
  }

  match &status.archive {
    Some(archive) => {
      println!("✅ Archive         {}", archive.path.display());
      println!("   Size:   {} bytes", archive.size);
      println!("   SHA-256: {}", archive.sha256);
    }
    None => println!("⬜ Archive         not built yet"),
  }

  println!("{} Command file    {}", mark(status.command_file), ctx.command_file().display());
  match &status.caption {
    Some(caption) => {
      let fits = caption.length <= caption.limit;
      println!(
        "{} Caption         {}/{} chars",
        mark(fits && caption.header_ok),
        caption.length,
        caption.limit
      );
      if !caption.header_ok {
        println!("   Expected start: '{}'", ctx.caption_header());
      }
    }
    None if status.command_file => println!("⚠️  Caption         not found"),
    None => {}
  }

  println!();
}
