//! Control engine root.
//!
//! Shared PID abstraction used by both the feedrate scaling loop and
//! the wire tension loop.

pub mod pid;
