//! # Teleop HAL Library
//!
//! Actuator backends for the teleop control unit.
//!
//! Backends implement the `Actuator` trait defined in
//! `teleop_common::hal::actuator` and are created by name through an
//! [`ActuatorRegistry`].
//!
//! # Module Structure
//!
//! - [`actuator_registry`] - Backend factory registration
//! - [`drivers`] - Backend implementations
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      teleop_hal                            │
//! │  ┌──────────────────┐        ┌──────────────────────────┐  │
//! │  │ ActuatorRegistry │──name─►│ ActuatorFactory          │  │
//! │  └──────────────────┘        └────────────┬─────────────┘  │
//! │                                           ▼                │
//! │                              ┌──────────────────────────┐  │
//! │                              │ Box<dyn Actuator>        │  │
//! │                              │ (simulation, ...)        │  │
//! │                              └──────────────────────────┘  │
//! └────────────────────────────────────────────────────────────┘
//! ```

pub mod actuator_registry;
pub mod drivers;

pub use crate::actuator_registry::ActuatorRegistry;
pub use crate::drivers::simulation::SimulatedRobot;
