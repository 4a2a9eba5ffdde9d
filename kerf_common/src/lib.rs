//! KERF Common Library
//!
//! Shared constants and configuration loading for the KERF wire-machining
//! workspace crates.
//!
//! # Module Structure
//!
//! - [`config`] - TOML configuration types, loading, and validation
//! - [`consts`] - System-wide numeric defaults
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use kerf_common::prelude::*;
//! ```

pub mod config;
pub mod consts;
pub mod prelude;
