//! Actuator backend implementations.
//!
//! - [`simulation`] - Software robot for development and testing
//!
//! # Adding New Backends
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement the `Actuator` trait from `teleop_common::hal::actuator`
//! 3. Register its factory in [`register_builtin`]

pub mod simulation;

use crate::actuator_registry::ActuatorRegistry;

/// Register every built-in backend.
pub fn register_builtin(registry: &mut ActuatorRegistry) {
    registry.register(simulation::BACKEND_NAME, simulation::create_actuator);
}
