// Structured logging to stdout; RUST_LOG overrides the default filter

use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info,tower_http=debug,sqlx=warn";

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    if let Err(e) = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .try_init()
    {
        tracing::warn!(error = %e, "tracing init failed");
    }
}
