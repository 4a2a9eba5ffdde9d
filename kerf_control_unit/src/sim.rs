//! Simulated external collaborators.
//!
//! Used by the demo binary and integration tests: a motion executor
//! with a virtual clock, wire-feed drivers that record instead of
//! driving pins, and a first-order power-supply model that produces
//! plausible duty-cycle samples for the scaling loop to chew on.

use tracing::{debug, trace};

use crate::actuator::WireFeed;
use crate::motion::coordinator::{ExecutorError, MotionExecutor};
use crate::motion::segment::{self, Position};

// ─── Simulated Motion Executor ──────────────────────────────────────

/// In-memory motion executor with a virtual clock.
///
/// Moves complete instantly in wall time; the virtual clock advances by
/// each move's kinematic duration so lookahead pacing behaves as it
/// would against real hardware.
pub struct SimExecutor {
    position: Position,
    clock: f64,
    moves_executed: usize,
    pending_lookahead: Option<Box<dyn FnOnce(f64) + Send>>,
}

impl SimExecutor {
    pub fn new() -> Self {
        Self {
            position: [0.0; 4],
            clock: 0.0,
            moves_executed: 0,
            pending_lookahead: None,
        }
    }

    /// Virtual time [s].
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Total moves accepted since construction.
    pub fn moves_executed(&self) -> usize {
        self.moves_executed
    }
}

impl Default for SimExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionExecutor for SimExecutor {
    fn submit_move(
        &mut self,
        end: Position,
        speed: f64,
        _accel: Option<f64>,
    ) -> Result<(), ExecutorError> {
        if !(speed > 0.0) {
            return Err(ExecutorError::new(format!(
                "move speed must be > 0, got {speed}"
            )));
        }
        let travel = segment::distance(self.position, end);
        self.clock += travel / speed;
        self.position = end;
        self.moves_executed += 1;
        trace!(?end, speed, clock = self.clock, "sim move executed");
        Ok(())
    }

    fn register_lookahead_callback(&mut self, callback: Box<dyn FnOnce(f64) + Send>) {
        self.pending_lookahead = Some(callback);
    }

    fn flush_lookahead(&mut self) {
        if let Some(callback) = self.pending_lookahead.take() {
            callback(self.clock);
        }
    }

    fn pause_until(&mut self, wake_time: f64) {
        if wake_time > self.clock {
            self.clock = wake_time;
        }
    }

    fn position(&self) -> Position {
        self.position
    }
}

// ─── Simulated Wire Feed ────────────────────────────────────────────

/// Wire-feed driver that logs commanded speeds instead of driving a pin.
pub struct SimWireFeed {
    name: &'static str,
    speed: f64,
}

impl SimWireFeed {
    pub fn new(name: &'static str) -> Self {
        Self { name, speed: 0.0 }
    }

    /// Last commanded speed (native 0..=255 units).
    pub fn speed(&self) -> f64 {
        self.speed
    }
}

impl WireFeed for SimWireFeed {
    fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
        debug!(actuator = self.name, speed, "sim wire feed speed");
    }
}

// ─── Simulated Power Supply ─────────────────────────────────────────

/// First-order duty-cycle model.
///
/// Faster cutting loads the supply harder, so the duty cycle relaxes
/// toward a load level proportional to the commanded feed speed. Crude,
/// but it closes the loop well enough to watch the controller settle.
pub struct SimPowerSupply {
    duty: f64,
    time_constant: f64,
}

impl SimPowerSupply {
    /// `time_constant` [s] controls how fast the duty cycle responds.
    pub fn new(initial_duty: f64, time_constant: f64) -> Self {
        Self {
            duty: initial_duty,
            time_constant,
        }
    }

    /// Advance the model by `dt` [s] under `feed_speed` [mm/s] and
    /// return the new duty-cycle reading.
    pub fn step(&mut self, feed_speed: f64, dt: f64) -> f64 {
        // Full load at 2 mm/s, the top of the default feed band.
        let load = (feed_speed / 2.0).clamp(0.0, 1.0);
        let alpha = (dt / self.time_constant).clamp(0.0, 1.0);
        self.duty += (load - self.duty) * alpha;
        self.duty
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
