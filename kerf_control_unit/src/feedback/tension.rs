//! Wire tension feedback loop.
//!
//! The load cell delivers sample batches once per update interval.
//! Only the newest sample in a batch is used — the driver attaches no
//! per-sample timestamps, so sub-batch jitter cannot be modeled. The
//! PID output ∈ [0, 1] is mapped to the actuator's native 0..=255
//! speed range and routed to the non-primary actuator; the primary is
//! reserved for direct operator feed commands so automatic control and
//! manual override never fight over one actuator.

use std::sync::{Arc, Mutex};

use kerf_common::config::{TensionConfig, WireActuator};
use kerf_common::consts::WIRE_SPEED_MAX;
use tracing::warn;

use crate::actuator::WireFeed;
use crate::control::pid::PidController;

/// Tension loop state.
#[derive(Debug)]
pub struct TensionLoop {
    pid: PidController,
    enabled: bool,
    primary: WireActuator,
}

impl TensionLoop {
    /// Build the loop from validated tension configuration. Starts disabled.
    pub fn from_config(tension: &TensionConfig) -> Self {
        Self {
            pid: PidController::new(
                tension.pid,
                tension.target,
                (0.0, 1.0),
                tension.update_interval,
            ),
            enabled: false,
            primary: tension.primary,
        }
    }

    /// Feed one load-cell batch at monotonic time `now` [s].
    ///
    /// Returns the actuator to drive and its speed in native units
    /// (0..=255, integer-valued), or `None` when the loop is disabled,
    /// the batch is empty, or the sample arrived inside the minimum
    /// update interval.
    pub fn on_batch(&mut self, samples: &[f64], now: f64) -> Option<(WireActuator, f64)> {
        if !self.enabled {
            return None;
        }
        let newest = *samples.last()?;
        let output = self.pid.update(newest, now)?;
        let speed = (output * WIRE_SPEED_MAX).round();
        Some((self.primary.other(), speed))
    }

    /// Enable automatic tension control, resetting the PID controller
    /// so a previous session's state cannot leak in.
    pub fn enable(&mut self) {
        self.pid.reset();
        self.enabled = true;
    }

    /// Disable automatic tension control. The driven actuator keeps its
    /// last commanded speed; stopping it is an operator decision.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Actuator reserved for operator feed commands.
    pub fn primary(&self) -> WireActuator {
        self.primary
    }

    /// Actuator the automatic loop drives.
    pub fn driven(&self) -> WireActuator {
        self.primary.other()
    }

    /// Zero the controller's integral and error history in place.
    pub fn reset_pid(&mut self) {
        self.pid.reset();
    }

    /// Re-target the loop (load-cell units).
    pub fn set_target(&mut self, target: f64) {
        self.pid.set_setpoint(target);
    }

    /// Current tension setpoint.
    pub fn target(&self) -> f64 {
        self.pid.setpoint()
    }

    /// Replace the loop gains; applies from the next batch without a reset.
    pub fn set_gains(&mut self, kp: f64, ki: f64, kd: f64) {
        self.pid.set_gains(kp, ki, kd);
    }

    /// Current (kp, ki, kd).
    pub fn gains(&self) -> (f64, f64, f64) {
        self.pid.gains()
    }
}

// ─── Sensor Handle ──────────────────────────────────────────────────

/// Cloneable handle registered with the load-cell driver.
///
/// Routes each batch through the tension loop and applies the resulting
/// speed to the driven actuator. A poisoned lock drops the batch; the
/// actuators keep their last commanded speeds.
pub struct LoadCellHandle<W> {
    session: Arc<Mutex<TensionLoop>>,
    sender: Arc<Mutex<W>>,
    receiver: Arc<Mutex<W>>,
}

impl<W> Clone for LoadCellHandle<W> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            sender: Arc::clone(&self.sender),
            receiver: Arc::clone(&self.receiver),
        }
    }
}

impl<W: WireFeed> LoadCellHandle<W> {
    pub fn new(
        session: Arc<Mutex<TensionLoop>>,
        sender: Arc<Mutex<W>>,
        receiver: Arc<Mutex<W>>,
    ) -> Self {
        Self {
            session,
            sender,
            receiver,
        }
    }

    /// Deliver one load-cell batch.
    pub fn on_batch(&self, samples: &[f64], now: f64) {
        let command = match self.session.lock() {
            Ok(mut session) => session.on_batch(samples, now),
            Err(_) => {
                warn!("tension loop poisoned, batch dropped");
                return;
            }
        };
        if let Some((actuator, speed)) = command {
            let feed = match actuator {
                WireActuator::Sender => &self.sender,
                WireActuator::Receiver => &self.receiver,
            };
            match feed.lock() {
                Ok(mut feed) => feed.set_speed(speed),
                Err(_) => warn!(?actuator, "wire feed poisoned, speed not applied"),
            }
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
