// src/utils/logging.rs
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level is "info", or "debug" with
/// `--verbose` so block boundaries and per-sheet counts show up.
pub fn setup_logging(verbose: bool) {
    let fallback = if verbose { "momr_extractor=debug,info" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(fallback));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    tracing::debug!("Logging setup complete (verbose: {}).", verbose);
}
