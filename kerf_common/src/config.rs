//! TOML configuration types, loading, and validation.
//!
//! All runtime state of the control core is re-derived from this
//! configuration at startup; nothing is persisted back.
//!
//! # TOML Example
//!
//! ```toml
//! [feed]
//! target_duty_cycle = 0.75
//! min_feedrate = 6.0      # mm/min
//! max_feedrate = 120.0    # mm/min
//! adjustment_accel = 5000.0
//! segment_length = 0.1    # mm
//! overlap_time = 0.001    # s
//! sample_interval = 0.1   # s
//!
//! [feed.pid]
//! kp = 0.1
//! ki = 0.0
//! kd = 0.0
//!
//! [tension]
//! target = 0.0
//! primary = "sender"
//! update_interval = 0.1
//!
//! [tension.pid]
//! kp = 0.1
//!
//! [tension.sender]
//! pin = "PA7"
//!
//! [tension.receiver]
//! pin = "PA8"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::consts::*;

// ─── Error Type ─────────────────────────────────────────────────────

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

// ─── Wire Actuator Designation ──────────────────────────────────────

/// One of the two wire-feed actuators.
///
/// The actuator configured as *primary* is reserved for direct operator
/// feed commands; the automatic tension loop always drives the other
/// one, so the two command sources never fight over a single actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WireActuator {
    /// Wire spool feeding into the cut.
    #[default]
    Sender,
    /// Wire spool taking up spent wire.
    Receiver,
}

impl WireActuator {
    /// The opposite actuator. Total — every actuator has exactly one other.
    #[inline]
    pub fn other(self) -> Self {
        match self {
            Self::Sender => Self::Receiver,
            Self::Receiver => Self::Sender,
        }
    }
}

impl std::fmt::Display for WireActuator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sender => write!(f, "sender"),
            Self::Receiver => write!(f, "receiver"),
        }
    }
}

// ─── Feed Range ─────────────────────────────────────────────────────

/// Scaled feedrate band [mm/min].
///
/// Invariant `min <= max` holds from construction through every
/// mutation; a violating update is rejected and leaves the prior pair
/// intact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedRange {
    min: f64,
    max: f64,
}

impl FeedRange {
    /// Build a feed range, rejecting `min > max` or non-positive `min`.
    pub fn new(min: f64, max: f64) -> Result<Self, ConfigError> {
        Self::check(min, max)?;
        Ok(Self { min, max })
    }

    fn check(min: f64, max: f64) -> Result<(), ConfigError> {
        if !(min > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "min_feedrate must be > 0, got {min}"
            )));
        }
        if min > max {
            return Err(ConfigError::ValidationError(format!(
                "min_feedrate must not exceed max_feedrate ({min} > {max})"
            )));
        }
        Ok(())
    }

    /// Replace both bounds. On rejection the stored pair is unchanged.
    pub fn set(&mut self, min: f64, max: f64) -> Result<(), ConfigError> {
        Self::check(min, max)?;
        self.min = min;
        self.max = max;
        Ok(())
    }

    /// Lower bound [mm/min].
    #[inline]
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound [mm/min].
    #[inline]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Linear interpolation of a normalized value into the band.
    ///
    /// `t` is expected in [0, 1]; the result is in [min, max] mm/min.
    #[inline]
    pub fn interpolate(&self, t: f64) -> f64 {
        self.min + t * (self.max - self.min)
    }
}

impl Default for FeedRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_FEEDRATE,
            max: DEFAULT_MAX_FEEDRATE,
        }
    }
}

// ─── PID Gains ──────────────────────────────────────────────────────

/// PID gain triple for one feedback loop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PidConfig {
    /// Proportional gain.
    #[serde(default = "default_kp")]
    pub kp: f64,
    /// Integral gain.
    #[serde(default)]
    pub ki: f64,
    /// Derivative gain.
    #[serde(default)]
    pub kd: f64,
}

fn default_kp() -> f64 {
    0.1
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            kp: default_kp(),
            ki: 0.0,
            kd: 0.0,
        }
    }
}

// ─── Feed Scaling Configuration ─────────────────────────────────────

/// Configuration for the duty-cycle feedrate scaling loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Duty cycle the loop drives toward (0..=1).
    #[serde(default = "default_target_duty_cycle")]
    pub target_duty_cycle: f64,

    /// Minimum scaled feedrate [mm/min].
    #[serde(default = "default_min_feedrate")]
    pub min_feedrate: f64,

    /// Maximum scaled feedrate [mm/min].
    #[serde(default = "default_max_feedrate")]
    pub max_feedrate: f64,

    /// Acceleration applied to scaled sub-moves [mm/s²].
    #[serde(default = "default_adjustment_accel")]
    pub adjustment_accel: f64,

    /// Target sub-move length for move segmentation [mm].
    #[serde(default = "default_segment_length")]
    pub segment_length: f64,

    /// Sub-move overlap margin [s].
    #[serde(default = "default_overlap_time")]
    pub overlap_time: f64,

    /// Duty-cycle sampling interval [s] — also the PID minimum sample period.
    #[serde(default = "default_duty_sample_interval")]
    pub sample_interval: f64,

    /// Feedrate loop PID gains.
    #[serde(default)]
    pub pid: PidConfig,

    /// Emit a debug log line per PID output (tuning aid).
    #[serde(default)]
    pub verbose_pid_output: bool,

    /// Emit a debug log line per scaled sub-move (tuning aid).
    #[serde(default)]
    pub verbose_move_scaling: bool,
}

fn default_target_duty_cycle() -> f64 {
    DEFAULT_TARGET_DUTY_CYCLE
}
fn default_min_feedrate() -> f64 {
    DEFAULT_MIN_FEEDRATE
}
fn default_max_feedrate() -> f64 {
    DEFAULT_MAX_FEEDRATE
}
fn default_adjustment_accel() -> f64 {
    DEFAULT_ADJUSTMENT_ACCEL
}
fn default_segment_length() -> f64 {
    DEFAULT_SEGMENT_LENGTH
}
fn default_overlap_time() -> f64 {
    DEFAULT_OVERLAP_TIME
}
fn default_duty_sample_interval() -> f64 {
    DEFAULT_DUTY_SAMPLE_INTERVAL
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            target_duty_cycle: default_target_duty_cycle(),
            min_feedrate: default_min_feedrate(),
            max_feedrate: default_max_feedrate(),
            adjustment_accel: default_adjustment_accel(),
            segment_length: default_segment_length(),
            overlap_time: default_overlap_time(),
            sample_interval: default_duty_sample_interval(),
            pid: PidConfig::default(),
            verbose_pid_output: false,
            verbose_move_scaling: false,
        }
    }
}

impl FeedConfig {
    /// Validate parameter bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.target_duty_cycle) {
            return Err(ConfigError::ValidationError(format!(
                "target_duty_cycle must be in [0, 1], got {}",
                self.target_duty_cycle
            )));
        }
        FeedRange::check(self.min_feedrate, self.max_feedrate)?;
        if !(self.adjustment_accel > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "adjustment_accel must be > 0, got {}",
                self.adjustment_accel
            )));
        }
        if !(self.segment_length > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "segment_length must be > 0, got {}",
                self.segment_length
            )));
        }
        if self.overlap_time < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "overlap_time must be >= 0, got {}",
                self.overlap_time
            )));
        }
        if !(self.sample_interval > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "sample_interval must be > 0, got {}",
                self.sample_interval
            )));
        }
        Ok(())
    }

    /// The configured feed range as a validated pair.
    pub fn feed_range(&self) -> Result<FeedRange, ConfigError> {
        FeedRange::new(self.min_feedrate, self.max_feedrate)
    }
}

// ─── Wire Tension Configuration ─────────────────────────────────────

/// Output-pin parameters for one wire actuator.
///
/// Opaque to the control core; handed to the external output-pin driver
/// at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActuatorOutputConfig {
    /// Output pin name (driver-specific).
    pub pin: String,
    /// PWM cycle time [s].
    #[serde(default = "default_actuator_cycle_time")]
    pub cycle_time: f64,
    /// Use hardware PWM when the pin supports it.
    #[serde(default)]
    pub hardware_pwm: bool,
    /// Output scale factor.
    #[serde(default = "default_actuator_scale")]
    pub scale: f64,
}

fn default_actuator_cycle_time() -> f64 {
    0.1
}
fn default_actuator_scale() -> f64 {
    1.0
}

impl ActuatorOutputConfig {
    fn validate(&self, which: &str) -> Result<(), ConfigError> {
        if self.pin.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{which}: pin must not be empty"
            )));
        }
        if !(self.cycle_time > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "{which}: cycle_time must be > 0, got {}",
                self.cycle_time
            )));
        }
        if !(self.scale > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "{which}: scale must be > 0, got {}",
                self.scale
            )));
        }
        Ok(())
    }
}

/// Configuration for the wire tension feedback loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TensionConfig {
    /// Tension setpoint (load-cell units — opaque, must match samples).
    #[serde(default = "default_wire_tension_target")]
    pub target: f64,

    /// Actuator reserved for direct operator feed commands.
    #[serde(default)]
    pub primary: WireActuator,

    /// Load-cell batch update interval [s] — also the PID minimum sample period.
    #[serde(default = "default_tension_update_interval")]
    pub update_interval: f64,

    /// Tension loop PID gains.
    #[serde(default)]
    pub pid: PidConfig,

    /// Sender actuator output pin.
    pub sender: ActuatorOutputConfig,

    /// Receiver actuator output pin.
    pub receiver: ActuatorOutputConfig,
}

fn default_wire_tension_target() -> f64 {
    DEFAULT_WIRE_TENSION_TARGET
}
fn default_tension_update_interval() -> f64 {
    DEFAULT_TENSION_UPDATE_INTERVAL
}

impl TensionConfig {
    /// Validate parameter bounds and actuator pin configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.update_interval > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "update_interval must be > 0, got {}",
                self.update_interval
            )));
        }
        self.sender.validate("tension.sender")?;
        self.receiver.validate("tension.receiver")?;
        if self.sender.pin == self.receiver.pin {
            return Err(ConfigError::ValidationError(format!(
                "sender and receiver share pin '{}'",
                self.sender.pin
            )));
        }
        Ok(())
    }
}

// ─── Top-Level Configuration ────────────────────────────────────────

/// Complete KERF control-unit configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KerfConfig {
    /// Feedrate scaling loop.
    #[serde(default)]
    pub feed: FeedConfig,

    /// Wire tension loop.
    pub tension: TensionConfig,
}

impl KerfConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string (for testing).
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Run all validation rules.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.feed.validate()?;
        self.tension.validate()?;
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
