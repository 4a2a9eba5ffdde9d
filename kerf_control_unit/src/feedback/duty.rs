//! Duty-cycle feedrate scaling loop.
//!
//! The power supply reports its PWM duty cycle through a periodic
//! sensor callback. When scaling is enabled, each sample updates a PID
//! controller whose output ∈ [0, 1] is the normalized position inside
//! the configured feedrate band; the coordinator reads that output
//! before every sub-move. When disabled, samples are ignored and the
//! last output persists untouched.

use std::sync::{Arc, Mutex};

use kerf_common::config::{ConfigError, FeedConfig};
use tracing::{debug, warn};

use crate::control::pid::PidController;

/// Feedrate scaling loop state.
#[derive(Debug)]
pub struct DutyCycleLoop {
    pid: PidController,
    enabled: bool,
    verbose: bool,
    last_sample: Option<f64>,
}

impl DutyCycleLoop {
    /// Build the loop from validated feed configuration. Starts disabled.
    pub fn from_config(feed: &FeedConfig) -> Self {
        Self {
            pid: PidController::new(
                feed.pid,
                feed.target_duty_cycle,
                (0.0, 1.0),
                feed.sample_interval,
            ),
            enabled: false,
            verbose: feed.verbose_pid_output,
            last_sample: None,
        }
    }

    /// Feed one duty-cycle sample at monotonic time `now` [s].
    ///
    /// A no-op while the loop is disabled; throttled samples keep the
    /// previous output.
    pub fn on_sample(&mut self, duty_cycle: f64, now: f64) {
        // Recorded even while disabled so operator queries always see
        // the latest reading; control action only happens when enabled.
        self.last_sample = Some(duty_cycle);
        if !self.enabled {
            return;
        }
        if let Some(output) = self.pid.update(duty_cycle, now)
            && self.verbose
        {
            debug!(duty_cycle, output, "scaling output updated");
        }
    }

    /// Current scaling output ∈ [0, 1] (0.0 before the first sample).
    pub fn output(&self) -> f64 {
        self.pid.last_output()
    }

    /// Most recent duty-cycle reading, enabled or not.
    pub fn last_sample(&self) -> Option<f64> {
        self.last_sample
    }

    /// Zero the controller's integral and error history in place.
    pub fn reset_pid(&mut self) {
        self.pid.reset();
    }

    /// Enable scaling. Always resets the PID controller so stale
    /// integral and error history from a previous session cannot leak
    /// into this one.
    pub fn enable(&mut self) {
        self.pid.reset();
        self.enabled = true;
    }

    /// Disable scaling. Takes effect on the next sample and move
    /// request; a segment already submitted is not recalled.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Re-target the loop. Rejected values leave the setpoint unchanged.
    pub fn set_target(&mut self, target: f64) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&target) {
            return Err(ConfigError::ValidationError(format!(
                "target_duty_cycle must be in [0, 1], got {target}"
            )));
        }
        self.pid.set_setpoint(target);
        Ok(())
    }

    /// Current duty-cycle target.
    pub fn target(&self) -> f64 {
        self.pid.setpoint()
    }

    /// Replace the loop gains; applies from the next sample without a reset.
    pub fn set_gains(&mut self, kp: f64, ki: f64, kd: f64) {
        self.pid.set_gains(kp, ki, kd);
    }

    /// Current (kp, ki, kd).
    pub fn gains(&self) -> (f64, f64, f64) {
        self.pid.gains()
    }
}

// ─── Sensor Handle ──────────────────────────────────────────────────

/// Cloneable handle registered with the duty-cycle sensor driver.
///
/// The driver calls [`on_sample`](Self::on_sample) from its own callback
/// context; the mutex keeps that sound even on a preemptive host.
#[derive(Clone)]
pub struct DutyCycleHandle {
    inner: Arc<Mutex<DutyCycleLoop>>,
}

impl DutyCycleHandle {
    pub fn new(inner: Arc<Mutex<DutyCycleLoop>>) -> Self {
        Self { inner }
    }

    /// Deliver one sensor sample. A poisoned loop drops the sample; the
    /// previous output stays authoritative, matching the late-sample rule.
    pub fn on_sample(&self, duty_cycle: f64, now: f64) {
        match self.inner.lock() {
            Ok(mut session) => session.on_sample(duty_cycle, now),
            Err(_) => warn!("duty-cycle loop poisoned, sample dropped"),
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
