use std::io;
use tracing_subscriber::{fmt, EnvFilter};

/// Default directives when `RUST_LOG` is unset: store operations at info,
/// snapshot I/O details at debug.
const DEFAULT_DIRECTIVES: &str = "info,service::storage=debug";

/// Initialize tracing subscriber with compact human-oriented output.
/// - Respects `RUST_LOG` if set
/// - Falls back to `info,service::storage=debug`
/// - Safe to call more than once; later calls are ignored
pub fn init_logging_default() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_writer(io::stdout)
        .try_init();
}

/// Initialize tracing subscriber with JSON structured output.
/// - Respects `RUST_LOG` if set, defaults to `info`
/// - Keeps the target so store diagnostics can be filtered downstream
pub fn init_logging_json() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .json()
        .with_writer(io::stdout)
        .try_init();
}
