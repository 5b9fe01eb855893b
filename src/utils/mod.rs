//! Utility modules for configuration and logging

pub mod config;
pub mod logging;

pub use config::{ConfigError, SessionConfig};
pub use logging::init_logging;

use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock time in milliseconds since the Unix epoch
pub fn current_time_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
