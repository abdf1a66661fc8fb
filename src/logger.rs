//! Logging setup for the command-line entry point.
//!
//! Library code only emits `tracing` events; installing a subscriber is left to the binary.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber.
///
/// `verbose` wins over `quiet`. Without either flag `RUST_LOG` is honoured, falling back to
/// info level for this crate.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
  let filter = if verbose {
    EnvFilter::new("whitelabel_build=debug")
  } else if quiet {
    EnvFilter::new("whitelabel_build=error")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("whitelabel_build=info"))
  };

  let fmt_layer = fmt::layer()
    .with_target(false)
    .with_level(true)
    .with_ansi(!no_color)
    .with_writer(std::io::stderr)
    .compact();

  tracing_subscriber::registry()
    .with(filter)
    .with(fmt_layer)
    .init();
}
