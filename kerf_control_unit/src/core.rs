//! Control core: command surface and wiring.
//!
//! Owns both feedback loops, the motion coordinator, and the shared
//! handles the external drivers call into. Every operator-facing
//! operation of the control unit goes through [`ControlCore`]; the
//! textual command dispatcher that parses operator input lives outside
//! this crate and delegates here.
//!
//! Locking discipline: each session and driver sits behind its own
//! mutex, locked only for the duration of one operation — except the
//! executor, which stays locked for a whole move so sub-move pacing is
//! never interleaved with a second motion request. Coordinator
//! parameters are snapshotted at move start; a feed-range change during
//! a move applies from the next move.

use std::sync::{Arc, Mutex};

use kerf_common::config::{KerfConfig, WireActuator};
use kerf_common::consts::WIRE_SPEED_MAX;
use tracing::{error, info};

use crate::actuator::WireFeed;
use crate::error::CoreError;
use crate::feedback::duty::{DutyCycleHandle, DutyCycleLoop};
use crate::feedback::tension::{LoadCellHandle, TensionLoop};
use crate::motion::coordinator::{Coordinator, MotionExecutor};
use crate::motion::segment::Position;

/// Notification fired when a segmented move aborts on an executor error.
pub type CommandErrorHook = Box<dyn Fn(&str) + Send + Sync>;

/// The adaptive motion-and-actuation control core.
///
/// `E` is the external motion executor, `W` the wire-feed actuator
/// driver (both actuators share one driver type).
pub struct ControlCore<E, W> {
    coordinator: Mutex<Coordinator>,
    duty: Arc<Mutex<DutyCycleLoop>>,
    tension: Arc<Mutex<TensionLoop>>,
    executor: Arc<Mutex<E>>,
    sender: Arc<Mutex<W>>,
    receiver: Arc<Mutex<W>>,
    on_command_error: Mutex<Option<CommandErrorHook>>,
}

impl<E: MotionExecutor, W: WireFeed> ControlCore<E, W> {
    /// Build the core from validated configuration and the external
    /// driver instances. Both feedback loops start disabled.
    pub fn new(config: &KerfConfig, executor: E, sender: W, receiver: W) -> Result<Self, CoreError> {
        config.validate()?;
        info!(
            primary = %config.tension.primary,
            target_duty_cycle = config.feed.target_duty_cycle,
            "control core initialized"
        );
        Ok(Self {
            coordinator: Mutex::new(Coordinator::from_config(&config.feed)?),
            duty: Arc::new(Mutex::new(DutyCycleLoop::from_config(&config.feed))),
            tension: Arc::new(Mutex::new(TensionLoop::from_config(&config.tension))),
            executor: Arc::new(Mutex::new(executor)),
            sender: Arc::new(Mutex::new(sender)),
            receiver: Arc::new(Mutex::new(receiver)),
            on_command_error: Mutex::new(None),
        })
    }

    /// Install the machine-wide command-error notification.
    pub fn set_command_error_hook(&self, hook: CommandErrorHook) -> Result<(), CoreError> {
        *lock(&self.on_command_error)? = Some(hook);
        Ok(())
    }

    // ─── Sensor Handles ─────────────────────────────────────────────

    /// Handle for the duty-cycle sensor driver's sample callback.
    pub fn duty_cycle_handle(&self) -> DutyCycleHandle {
        DutyCycleHandle::new(Arc::clone(&self.duty))
    }

    /// Handle for the load-cell driver's batch callback.
    pub fn load_cell_handle(&self) -> LoadCellHandle<W> {
        LoadCellHandle::new(
            Arc::clone(&self.tension),
            Arc::clone(&self.sender),
            Arc::clone(&self.receiver),
        )
    }

    // ─── Feedrate Scaling Commands ──────────────────────────────────

    /// Enable feedrate scaling; always resets the loop's controller.
    pub fn enable_scaling(&self) -> Result<(), CoreError> {
        lock(&self.duty)?.enable();
        info!("feedrate scaling enabled");
        Ok(())
    }

    /// Disable feedrate scaling; subsequent moves pass through unsplit.
    pub fn disable_scaling(&self) -> Result<(), CoreError> {
        lock(&self.duty)?.disable();
        info!("feedrate scaling disabled");
        Ok(())
    }

    pub fn scaling_enabled(&self) -> Result<bool, CoreError> {
        Ok(lock(&self.duty)?.is_enabled())
    }

    /// Latest duty-cycle reading from the sensor, if any arrived yet,
    /// rounded to 3 decimals for operator display.
    pub fn current_duty_cycle(&self) -> Result<Option<f64>, CoreError> {
        Ok(lock(&self.duty)?
            .last_sample()
            .map(|d| (d * 1000.0).round() / 1000.0))
    }

    /// Re-target the scaling loop; rejects values outside [0, 1].
    pub fn set_target_duty_cycle(&self, target: f64) -> Result<(), CoreError> {
        lock(&self.duty)?.set_target(target)?;
        Ok(())
    }

    pub fn target_duty_cycle(&self) -> Result<f64, CoreError> {
        Ok(lock(&self.duty)?.target())
    }

    /// Replace the scaling loop gains without resetting the controller.
    pub fn set_feed_pid_gains(&self, kp: f64, ki: f64, kd: f64) -> Result<(), CoreError> {
        lock(&self.duty)?.set_gains(kp, ki, kd);
        Ok(())
    }

    pub fn feed_pid_gains(&self) -> Result<(f64, f64, f64), CoreError> {
        Ok(lock(&self.duty)?.gains())
    }

    /// Zero the scaling controller's integral and error history.
    pub fn reset_feed_pid(&self) -> Result<(), CoreError> {
        lock(&self.duty)?.reset_pid();
        Ok(())
    }

    /// Replace the scaled feedrate band [mm/min]. A `min > max` or
    /// non-positive pair is rejected and the prior band stays in force.
    pub fn set_feed_range(&self, min: f64, max: f64) -> Result<(), CoreError> {
        let mut coordinator = lock(&self.coordinator)?;
        let mut range = coordinator.feed_range();
        range.set(min, max)?;
        coordinator.set_feed_range(range);
        Ok(())
    }

    /// Current feedrate band as (min, max) [mm/min].
    pub fn feed_range(&self) -> Result<(f64, f64), CoreError> {
        let range = lock(&self.coordinator)?.feed_range();
        Ok((range.min(), range.max()))
    }

    // ─── Wire Tension Commands ──────────────────────────────────────

    /// Enable automatic tension control; always resets the loop's
    /// controller.
    pub fn enable_tension(&self) -> Result<(), CoreError> {
        lock(&self.tension)?.enable();
        info!("wire tension loop enabled");
        Ok(())
    }

    /// Disable automatic tension control; the driven actuator keeps its
    /// last commanded speed.
    pub fn disable_tension(&self) -> Result<(), CoreError> {
        lock(&self.tension)?.disable();
        info!("wire tension loop disabled");
        Ok(())
    }

    pub fn tension_enabled(&self) -> Result<bool, CoreError> {
        Ok(lock(&self.tension)?.is_enabled())
    }

    /// Re-target the tension loop (load-cell units).
    pub fn set_tension_target(&self, target: f64) -> Result<(), CoreError> {
        lock(&self.tension)?.set_target(target);
        Ok(())
    }

    pub fn tension_target(&self) -> Result<f64, CoreError> {
        Ok(lock(&self.tension)?.target())
    }

    /// Replace the tension loop gains without resetting the controller.
    pub fn set_tension_pid_gains(&self, kp: f64, ki: f64, kd: f64) -> Result<(), CoreError> {
        lock(&self.tension)?.set_gains(kp, ki, kd);
        Ok(())
    }

    pub fn tension_pid_gains(&self) -> Result<(f64, f64, f64), CoreError> {
        Ok(lock(&self.tension)?.gains())
    }

    /// Zero the tension controller's integral and error history.
    pub fn reset_tension_pid(&self) -> Result<(), CoreError> {
        lock(&self.tension)?.reset_pid();
        Ok(())
    }

    /// Directly command the wire feed speed (native 0..=255 units,
    /// clamped). With the tension loop disabled both actuators take the
    /// speed; with it enabled only the primary does — the loop keeps
    /// driving the other.
    pub fn set_wire_feed_speed(&self, speed: f64) -> Result<(), CoreError> {
        let speed = speed.clamp(0.0, WIRE_SPEED_MAX);
        let (drive_sender, drive_receiver) = {
            let tension = lock(&self.tension)?;
            if tension.is_enabled() {
                match tension.primary() {
                    WireActuator::Sender => (true, false),
                    WireActuator::Receiver => (false, true),
                }
            } else {
                (true, true)
            }
        };
        if drive_sender {
            lock(&self.sender)?.set_speed(speed);
        }
        if drive_receiver {
            lock(&self.receiver)?.set_speed(speed);
        }
        Ok(())
    }

    // ─── Motion ─────────────────────────────────────────────────────

    /// Execute one motion request to `end` at `speed` [mm/s].
    ///
    /// With scaling disabled this is a single pass-through call to the
    /// executor. With scaling enabled the move is segmented and each
    /// sub-move is submitted at the feedrate derived from the scaling
    /// output current at its submission; duty-cycle samples arriving
    /// during the move retarget the remaining sub-moves. On an executor
    /// error the remaining sub-moves are abandoned, the command-error
    /// notification fires, and the error is returned; traversed
    /// geometry stays traversed.
    pub fn move_to(&self, end: Position, speed: f64) -> Result<(), CoreError> {
        // Parameter snapshot: feed range and pacing are fixed for the
        // whole move, the scaling output is not.
        let coordinator = lock(&self.coordinator)?.clone();
        let scaling_enabled = lock(&self.duty)?.is_enabled();

        let mut executor = lock(&self.executor)?;
        let result = if scaling_enabled {
            let duty = Arc::clone(&self.duty);
            let mut output = move || match duty.lock() {
                Ok(session) => session.output(),
                // Poisoned mid-move: hold the band floor rather than
                // abort a cut in progress.
                Err(_) => 0.0,
            };
            coordinator.move_to(&mut *executor, end, speed, Some(&mut output))
        } else {
            coordinator.move_to(&mut *executor, end, speed, None)
        };

        if let Err(ref e) = result {
            error!(error = %e, "move aborted by executor");
            if let Ok(hook) = self.on_command_error.lock()
                && let Some(hook) = hook.as_ref()
            {
                hook(&e.to_string());
            }
        }
        result.map_err(CoreError::from)
    }
}

/// Poison-mapping lock helper; one panicking callback must not take the
/// whole command surface down silently.
fn lock<T>(mutex: &Mutex<T>) -> Result<std::sync::MutexGuard<'_, T>, CoreError> {
    mutex.lock().map_err(|_| CoreError::Poisoned)
}

// ─── Tests ──────────────────────────────────────────────────────────
