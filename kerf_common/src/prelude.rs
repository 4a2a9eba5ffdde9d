//! Prelude module for common re-exports.
//!
//! Consumers can `use kerf_common::prelude::*;` and get the most
//! important types without listing individual paths.

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{
    ActuatorOutputConfig, ConfigError, FeedConfig, FeedRange, KerfConfig, PidConfig,
    TensionConfig, WireActuator,
};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{POSITION_AXES, WIRE_SPEED_MAX};
