//! Control-core error taxonomy.
//!
//! Configuration errors are rejected with no state change; executor
//! command errors abort the remaining sub-moves of a segmented move but
//! leave already-traversed geometry in place. Sensor-timing throttling
//! is not an error and never surfaces here.

use kerf_common::config::ConfigError;
use thiserror::Error;

use crate::motion::coordinator::ExecutorError;

/// Top-level error for Command Surface operations and move execution.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid configuration value; prior state is unchanged.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The motion executor reported a command error mid-move.
    #[error(transparent)]
    Executor(#[from] ExecutorError),

    /// A shared session lock was poisoned by a panicking thread.
    #[error("control core state lock poisoned")]
    Poisoned,
}
