#![forbid(unsafe_code)]

//! Process-wide log subscriber.

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Install a `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// `directive` (for example `"info,barpos_menu=debug"`).
///
/// # Errors
///
/// [`AppError::Logging`] if the directive does not parse or a global
/// subscriber is already installed.
pub fn init_logging(directive: &str) -> Result<(), AppError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(directive).map_err(|e| AppError::Logging(e.to_string()))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))
}
