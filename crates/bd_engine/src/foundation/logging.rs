//! Logging setup

pub use log::{debug, error, info, trace, warn};

/// Initialize `env_logger` with `default_filter` unless `RUST_LOG` is set
///
/// Safe to call more than once; only the first call installs a logger.
pub fn init(default_filter: &str) {
    let env = env_logger::Env::default().default_filter_or(default_filter);
    if env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init()
        .is_err()
    {
        log::debug!("Logger already initialized");
    }
}
