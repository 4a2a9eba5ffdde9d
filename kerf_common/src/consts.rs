//! System-wide constants for the KERF workspace.
//!
//! Single source of truth for default tuning values. Imported by all
//! crates — no duplication permitted.

/// Default target duty cycle (fraction of PWM period, 0..=1).
pub const DEFAULT_TARGET_DUTY_CYCLE: f64 = 0.75;

/// Default minimum scaled feedrate [mm/min].
pub const DEFAULT_MIN_FEEDRATE: f64 = 6.0;

/// Default maximum scaled feedrate [mm/min].
pub const DEFAULT_MAX_FEEDRATE: f64 = 120.0;

/// Default acceleration applied to scaled sub-moves [mm/s²].
pub const DEFAULT_ADJUSTMENT_ACCEL: f64 = 5000.0;

/// Default target sub-move length for move segmentation [mm].
pub const DEFAULT_SEGMENT_LENGTH: f64 = 0.1;

/// Default sub-move overlap margin [s].
///
/// Zero would fully serialize segments: each one finishes before the
/// next is submitted.
pub const DEFAULT_OVERLAP_TIME: f64 = 0.001;

/// Default duty-cycle sampling interval [s].
pub const DEFAULT_DUTY_SAMPLE_INTERVAL: f64 = 0.1;

/// Default load-cell batch update interval [s].
pub const DEFAULT_TENSION_UPDATE_INTERVAL: f64 = 0.1;

/// Default wire tension target (load-cell units, opaque).
pub const DEFAULT_WIRE_TENSION_TARGET: f64 = 0.0;

/// Native speed range ceiling of the wire actuator driver.
///
/// Feedback-loop output in [0, 1] is mapped onto 0..=255.
pub const WIRE_SPEED_MAX: f64 = 255.0;

/// Decimal places kept for intermediate segment coordinates.
pub const SEGMENT_COORD_DECIMALS: i32 = 3;

/// Number of coordinate axes carried per position (X, Y, Z, wire).
pub const POSITION_AXES: usize = 4;

/// Default configuration file path, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/kerf.toml";
