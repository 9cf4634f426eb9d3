//! Tracing subscriber setup.
//!
//! The engine logs through [`tracing`] everywhere (sink failures, no-op event
//! paths, auto-save outcomes); hosts that want those logs on a terminal can
//! call [`init_tracing`] once at startup. Filtering follows `RUST_LOG`, e.g.
//! `RUST_LOG=chatloom=debug`.

use tracing_subscriber::EnvFilter;

/// Installs a formatted stderr subscriber with env-based filtering.
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
