//! Registry of actuator backends.
//!
//! Backends are looked up by the `actuator.driver` config key. The registry
//! is built at startup and handed to whoever creates the actuator; there is
//! no global state.

use std::collections::HashMap;

use teleop_common::control_unit::ActuatorConfig;
use teleop_common::hal::actuator::{Actuator, ActuatorError, ActuatorFactory};

/// Registry of available actuator backends.
pub struct ActuatorRegistry {
    factories: HashMap<&'static str, ActuatorFactory>,
}

impl ActuatorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry pre-populated with every built-in backend.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        crate::drivers::register_builtin(&mut registry);
        registry
    }

    /// Register a backend factory.
    ///
    /// # Panics
    /// Panics if a backend with the same name is already registered.
    pub fn register(&mut self, name: &'static str, factory: ActuatorFactory) {
        if self.factories.contains_key(name) {
            panic!("Actuator backend '{name}' is already registered");
        }
        self.factories.insert(name, factory);
    }

    /// Get a backend factory by name.
    pub fn get_factory(&self, name: &str) -> Option<ActuatorFactory> {
        self.factories.get(name).copied()
    }

    /// Create the backend selected by `config.driver`.
    ///
    /// # Errors
    /// `ActuatorError::BackendNotFound` if the name is not registered, or
    /// whatever the factory returns if the backend fails to come up.
    pub fn create(&self, config: &ActuatorConfig) -> Result<Box<dyn Actuator>, ActuatorError> {
        let factory = self
            .get_factory(&config.driver)
            .ok_or_else(|| ActuatorError::BackendNotFound(config.driver.clone()))?;
        factory(config)
    }

    /// All registered backend names, sorted.
    pub fn list_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for ActuatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
