mod commands;
mod core;
mod logging;
mod notary;
mod release;

use clap::{Parser, Subcommand};
use core::config::UpdatesConfig;
use core::context::{ReleaseContext, ReleaseDate};
use core::error::{ReleaseError, ReleaseResult, ResultExt, print_error};
use std::path::PathBuf;

/// Build, notarize and announce macOS debug updates
#[derive(Parser)]
#[command(name = "desk-updates")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Application source directory (default: current directory)
  #[arg(long, global = true)]
  root: Option<PathBuf>,

  /// Configuration file (default: updates.toml under the root)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Print debug diagnostics, including every external command
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build, sign, notarize and package today's update
  Build {
    /// Release date (default: today, DD_MM_YY)
    #[arg(long)]
    date: Option<String>,
    /// Resume polling a request that was already submitted
    #[arg(long)]
    request_uuid: Option<String>,
  },

  /// Render the send command with the changelog since a commit
  Compose {
    /// Last commit included in the previous update
    #[arg(long)]
    from: String,
    /// Release date (default: today, DD_MM_YY)
    #[arg(long)]
    date: Option<String>,
  },

  /// Send the composed update through the built app
  Send {
    /// Release date (default: today, DD_MM_YY)
    #[arg(long)]
    date: Option<String>,
  },

  /// Show how far the update for a date has progressed
  Status {
    /// Release date (default: today, DD_MM_YY)
    #[arg(long)]
    date: Option<String>,
    /// Output status in JSON format
    #[arg(long)]
    json: bool,
  },
}

impl Commands {
  fn date(&self) -> Option<&str> {
    match self {
      Commands::Build { date, .. }
      | Commands::Compose { date, .. }
      | Commands::Send { date }
      | Commands::Status { date, .. } => date.as_deref(),
    }
  }
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  let cli = Cli::parse();
  logging::init_tracing(cli.verbose);

  let ctx = match build_context(&cli) {
    Ok(ctx) => ctx,
    Err(e) => handle_error(e),
  };
  tracing::debug!(root = %ctx.root().display(), date = %ctx.date, "release context ready");

  let result = match cli.command {
    Commands::Build { request_uuid, .. } => commands::run_build(&ctx, request_uuid),
    Commands::Compose { from, .. } => commands::run_compose(&ctx, &from),
    Commands::Send { .. } => commands::run_send(&ctx),
    Commands::Status { json, .. } => commands::run_status(&ctx, json),
  };

  if let Err(e) = result {
    handle_error(e);
  }
}

/// Resolve root, configuration and date before any command runs
fn build_context(cli: &Cli) -> ReleaseResult<ReleaseContext> {
  let current_dir = std::env::current_dir().context("Failed to get current directory")?;
  let explicit = cli.config.as_ref().map(|path| current_dir.join(path));
  let root = match &cli.root {
    Some(root) => current_dir.join(root),
    None => current_dir,
  };

  let config = UpdatesConfig::load(&root, explicit.as_deref())?;

  let date = match cli.command.date() {
    Some(date) => ReleaseDate::parse(date)?,
    None => ReleaseDate::today(),
  };

  Ok(ReleaseContext::new(root, config, date))
}

fn handle_error(err: ReleaseError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
