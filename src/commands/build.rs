//! `desk-updates build`: compile, sign, notarize and package one release

use crate::core::context::ReleaseContext;
use crate::core::error::{ConfigError, ReleaseResult};
use crate::notary::{self, Altool, NotaryService, Notarizer};
use crate::release::{BuildPipeline, archive_digest};

/// Run the build command
///
/// With `request_uuid` the compile/sign/submit half is skipped and polling
/// resumes for an archive that was already uploaded.
pub fn run_build(ctx: &ReleaseContext, request_uuid: Option<String>) -> ReleaseResult<()> {
  let notary_config = &ctx.config.notary;
  let username = std::env::var(&notary_config.username_env).map_err(|_| ConfigError::MissingEnv {
    name: notary_config.username_env.clone(),
  })?;

  let altool = Altool::new(&ctx.config.app.bundle_id, &username, notary_config, &ctx.config_dir());
  let notarizer = Notarizer::new(altool, notary_config.poll_interval(), notary_config.poll_timeout());

  run_with(ctx, &notarizer, request_uuid)
}

/// Build against any notarization backend
pub fn run_with<S: NotaryService>(
  ctx: &ReleaseContext,
  notarizer: &Notarizer<S>,
  request_uuid: Option<String>,
) -> ReleaseResult<()> {
  let pipeline = BuildPipeline::new(ctx);

  println!("📦 Building {} version {}..", ctx.config.build.configuration, ctx.date);
  pipeline.ensure_not_built()?;

  let request_uuid = match request_uuid {
    Some(uuid) => {
      println!("🔁 Continue with request UUID: {}", uuid);
      uuid
    }
    None => {
      pipeline.configure()?;
      pipeline.compile()?;
      pipeline.require_bundle()?;
      pipeline.strip()?;
      pipeline.sign()?;
      println!("   Signed {}", ctx.app_bundle_name());
      pipeline.verify_bundle()?;
      pipeline.stage()?;
      let archive = pipeline.pack()?;
      notarizer.submit(&archive)?
    }
  };

  let outcome = notarizer.wait(&request_uuid)?;
  notarizer.require_success(&request_uuid, &outcome)?;
  let log = notarizer.fetch_log(&outcome)?;

  pipeline.staple()?;
  pipeline.restage()?;
  let published = pipeline.publish()?;

  println!();
  println!("✅ Finished.");
  println!("   Archive: {}", published.display());
  println!("   SHA-256: {}", archive_digest(&published)?);
  println!();

  notary::report_log(log.as_deref());

  Ok(())
}
