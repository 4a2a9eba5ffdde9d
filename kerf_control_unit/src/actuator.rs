//! Wire-feed actuator boundary.
//!
//! The physical actuators are PWM output pins owned by an external
//! driver; the core only commands a speed in the driver's native
//! 0..=255 range. Which of the two actuators the automatic tension
//! loop drives is decided by [`WireActuator::other`] applied to the
//! configured primary.

pub use kerf_common::config::WireActuator;

/// Output interface of one wire-feed actuator.
///
/// Implemented by the external output-pin driver (or a simulation).
/// `speed` is in the driver's native range, 0..=255.
pub trait WireFeed {
    /// Command the actuator to the given speed.
    fn set_speed(&mut self, speed: f64);
}
