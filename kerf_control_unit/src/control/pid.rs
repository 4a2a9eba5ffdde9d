//! PID controller with sample-period throttling and anti-windup via
//! output clamping.
//!
//! `update` produces a new output at most once per minimum sample
//! period; callers must treat `None` as "keep using the last output",
//! not as zero. Zero Ki disables the integral; zero Kd disables the
//! derivative.

use kerf_common::config::PidConfig;

/// PID controller state for one feedback loop.
///
/// Owned exclusively by the loop that uses it and lives for the process
/// lifetime of that loop. Mutated only through [`update`](Self::update),
/// the setpoint/gain setters, and [`reset`](Self::reset).
#[derive(Debug, Clone)]
pub struct PidController {
    // Tuning
    kp: f64,
    ki: f64,
    kd: f64,
    setpoint: f64,
    output_min: f64,
    output_max: f64,
    /// Minimum time between produced outputs [s].
    min_sample_period: f64,

    // Internal state
    integral: f64,
    last_error: Option<f64>,
    last_time: Option<f64>,
    last_output: f64,
}

impl PidController {
    /// Create a controller with the given gains, setpoint, output bounds,
    /// and minimum sample period [s].
    pub fn new(
        gains: PidConfig,
        setpoint: f64,
        output_bounds: (f64, f64),
        min_sample_period: f64,
    ) -> Self {
        let (output_min, output_max) = output_bounds;
        debug_assert!(output_min <= output_max);
        debug_assert!(min_sample_period > 0.0);

        Self {
            kp: gains.kp,
            ki: gains.ki,
            kd: gains.kd,
            setpoint,
            output_min,
            output_max,
            min_sample_period,

            integral: 0.0,
            last_error: None,
            last_time: None,
            last_output: 0.0,
        }
    }

    /// Feed one sample at monotonic time `now` [s].
    ///
    /// Returns `None` when called again within the minimum sample
    /// period — the previous output remains authoritative. Otherwise
    /// computes a new clamped output and stores it as the last output.
    pub fn update(&mut self, sample: f64, now: f64) -> Option<f64> {
        let dt = match self.last_time {
            Some(last) => {
                let dt = now - last;
                if dt < self.min_sample_period {
                    return None;
                }
                dt
            }
            // First sample after construction or reset: no real elapsed
            // time exists, so assume one nominal period.
            None => self.min_sample_period,
        };

        let error = self.setpoint - sample;

        // Derivative on error; no history yet means no derivative kick.
        let derivative = match self.last_error {
            Some(prev) => (error - prev) / dt,
            None => 0.0,
        };

        // Integrate, then clamp the integral term's contribution to the
        // output bounds: accumulation effectively stops once the output
        // saturates, and the excess never has to unwind.
        self.integral += error * dt;
        if self.ki != 0.0 {
            let i_term = (self.ki * self.integral).clamp(self.output_min, self.output_max);
            self.integral = i_term / self.ki;
        }

        let raw = self.kp * error + self.ki * self.integral + self.kd * derivative;
        let output = raw.clamp(self.output_min, self.output_max);

        self.last_error = Some(error);
        self.last_time = Some(now);
        self.last_output = output;

        Some(output)
    }

    /// Zero the integral and error history.
    ///
    /// Setpoint, gains, and bounds are untouched; no output is produced.
    /// The next `update` behaves exactly like the first call on a freshly
    /// constructed controller.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.last_error = None;
        self.last_time = None;
    }

    /// Re-target the controller; applies to the next `update` without a reset.
    pub fn set_setpoint(&mut self, setpoint: f64) {
        self.setpoint = setpoint;
    }

    /// Current setpoint.
    #[inline]
    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    /// Replace all three gains; applies to the next `update` without a reset.
    pub fn set_gains(&mut self, kp: f64, ki: f64, kd: f64) {
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
    }

    /// Current (kp, ki, kd).
    #[inline]
    pub fn gains(&self) -> (f64, f64, f64) {
        (self.kp, self.ki, self.kd)
    }

    /// Most recently produced output (0.0 before the first update).
    #[inline]
    pub fn last_output(&self) -> f64 {
        self.last_output
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
