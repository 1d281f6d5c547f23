//! Logging setup emitting JSON lines through `tracing`.

use tracing_subscriber::EnvFilter;

use super::config::AppCfg;

/// Install the global JSON-lines subscriber.
///
/// Safe to call more than once; only the first call installs anything.
pub fn init(cfg: &AppCfg) {
    let filter = EnvFilter::try_new(&cfg.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
