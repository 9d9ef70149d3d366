//! Actuator abstraction layer.
//!
//! This module contains the Actuator Interface consumed by the control unit
//! and the value types that cross it.

pub mod actuator;
pub mod posture;
pub mod types;
