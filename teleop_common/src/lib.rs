//! Teleop Common Library
//!
//! Shared constants, configuration loading, the Actuator Interface and the
//! session wire protocol for all teleop workspace crates.
//!
//! # Module Structure
//!
//! - [`consts`] - System-wide constants (ports, rates, limits)
//! - [`config`] - Configuration loading traits and types
//! - [`control_unit`] - Control unit configuration sections
//! - [`hal`] - Actuator Interface trait and the value types crossing it
//! - [`protocol`] - Line-delimited JSON request/reply envelopes
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use teleop_common::prelude::*;
//!
//! let v = Velocity::clipped(2.0, 0.0, -0.5);
//! assert_eq!(v.vx, 1.0);
//! ```

pub mod config;
pub mod consts;
pub mod control_unit;
pub mod hal;
pub mod prelude;
pub mod protocol;
