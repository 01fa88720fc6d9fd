use std::io;
use tracing_subscriber::{fmt, EnvFilter};

/// Request spans from `tower_http` and the car service events at INFO.
const DEFAULT_FILTER: &str = "info,tower_http=info,axum=info";

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Compact single-line output for local runs. `RUST_LOG` replaces the
/// default filter, e.g. `RUST_LOG=debug,tower_http=debug` to see rejected
/// requests and their details.
pub fn init_logging_default() {
    let _ = fmt()
        .with_env_filter(filter())
        .with_target(false)
        .compact()
        .with_writer(io::stdout)
        .try_init();
}

/// One JSON object per event, for log shippers. Same filter rules as the
/// compact format.
pub fn init_logging_json() {
    let _ = fmt()
        .with_env_filter(filter())
        .with_target(false)
        .json()
        .with_writer(io::stdout)
        .try_init();
}
