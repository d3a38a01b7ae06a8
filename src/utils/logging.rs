//! Conditional logging macros gated by a module-level `ENABLE_LOGS` flag and
//! tagged with a module-level `LOG_TARGET`.
//!
//! Usage:
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//! const LOG_TARGET: &str = "proctor::ledger";
//!
//! use crate::{log_info, log_warn};
//!
//! log_info!("violation recorded for session {}", session_id);
//! ```
//!
//! Filtering by target works with `RUST_LOG`, e.g.
//! `RUST_LOG=proctor::face=debug`.

use std::sync::Once;

static INIT: Once = Once::new();

/// Level applied when `RUST_LOG` does not say otherwise.
pub const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;

/// Installs the `env_logger` backend (reads `RUST_LOG`, defaults to `info`).
/// Calling it more than once is harmless.
pub fn init_logging() {
    INIT.call_once(|| {
        let _ = env_logger::Builder::new()
            .filter_level(DEFAULT_LOG_LEVEL)
            .parse_default_env()
            .try_init();
    });
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::debug!(target: LOG_TARGET, $($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!(target: LOG_TARGET, $($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!(target: LOG_TARGET, $($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!(target: LOG_TARGET, $($arg)*);
        }
    };
}
