//! # KERF Control Unit Library
//!
//! Adaptive motion-and-actuation control core for the KERF wire-handling
//! machine tool. Two independent PID feedback loops run on asynchronously
//! arriving sensor samples:
//!
//! 1. **Feedrate scaling** — a duty-cycle signal from the power supply is
//!    driven toward a target by scaling the feedrate of the moving tool.
//!    A commanded move is chopped into short sub-moves so the scaled
//!    feedrate can be re-applied with bounded latency while in motion.
//! 2. **Wire tension** — load-cell samples drive one of the two wire-feed
//!    actuators; the other is reserved for direct operator commands.
//!
//! The core never spawns threads: sensor callbacks and move commands are
//! invoked by the host scheduler, and the only suspension point is the
//! cooperative `pause_until` between sub-moves. Shared sessions are
//! mutex-wrapped so the same code is sound on a preemptive host.

pub mod actuator;
pub mod control;
pub mod core;
pub mod error;
pub mod feedback;
pub mod motion;
pub mod sim;
