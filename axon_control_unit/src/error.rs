//! Error types of the control unit.
//!
//! Only start-up and remote configuration calls return `Err`. Runtime
//! conditions inside the cycle are fault codes and status events instead.

use axon_common::config::ConfigError;
use axon_common::persist::StoreError;
use thiserror::Error;

/// Failure before the control loop starts.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("record store directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("signal handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

/// Rejected remote configuration request.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("axis index {0} out of range")]
    AxisOutOfRange(usize),

    #[error("request rejected: {0}")]
    Rejected(&'static str),

    /// The in-memory change was applied; only persisting it failed.
    #[error("persist failed: {0}")]
    Store(#[from] StoreError),
}
