use keel_config::constants::{KEEL_LOG, RUST_LOG};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `KEEL_LOG` wins over `RUST_LOG`; default `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(KEEL_LOG)
        .or_else(|_| EnvFilter::try_from_env(RUST_LOG))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
