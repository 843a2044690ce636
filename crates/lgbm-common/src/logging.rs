use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the tracing filter directive.
pub const LOG_ENV: &str = "LGBM_BRIDGE_LOG";

/// Initialize structured logging with environment filter.
/// Set LGBM_BRIDGE_LOG=debug (or trace, info, warn, error) for verbosity control.
pub fn init_logging() {
    init_logging_with_default("info");
}

/// Same as [`init_logging`], but falls back to `default_filter` when the
/// environment variable is unset.
pub fn init_logging_with_default(default_filter: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();
}

/// Install a subscriber unless one is already set. Used by the C ABI, which
/// has no `main` and may be loaded into a host that configured its own.
pub fn try_init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
