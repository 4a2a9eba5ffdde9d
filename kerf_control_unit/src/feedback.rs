//! Sensor-driven feedback loops.
//!
//! [`duty`] turns power-supply duty-cycle samples into a feedrate
//! scaling output; [`tension`] turns load-cell batches into wire-feed
//! actuator speeds. Both loops are driven entirely by sensor callbacks
//! from the host scheduler and hold their output between samples.

pub mod duty;
pub mod tension;
