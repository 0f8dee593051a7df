//! Diagnostic logging
//!
//! Progress for humans goes to stdout with `println!`. Everything here is for
//! debugging the tool itself and goes to stderr.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber
///
/// `RUST_LOG` wins when set. Otherwise `--verbose` enables debug output for this
/// crate, which includes every external command line.
pub fn init_tracing(verbose: bool) {
  let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
    if verbose {
      EnvFilter::new("desk_updates=debug")
    } else {
      EnvFilter::new("desk_updates=warn")
    }
  });

  let layer = fmt::layer()
    .with_writer(std::io::stderr)
    .with_target(verbose)
    .with_thread_ids(false)
    .with_line_number(false)
    .with_file(false)
    .compact();

  // A subscriber may already be set when embedded in tests
  let _ = tracing_subscriber::registry().with(env_filter).with(layer).try_init();
}
