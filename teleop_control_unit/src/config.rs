//! Configuration loading for the control unit.
//!
//! A missing file is not an error: the built-in defaults apply and a WARN is
//! logged. Parse and validation failures are fatal. CLI overrides are applied
//! before validation so an out-of-range flag is rejected the same way an
//! out-of-range file value is.

use std::path::{Path, PathBuf};

use teleop_common::config::{ConfigError, ConfigLoader};
use teleop_common::control_unit::TeleopConfig;
use tracing::{info, warn};

/// Where the configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

/// Configuration plus its origin, ready for runtime use.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: TeleopConfig,
    pub source: ConfigSource,
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub loop_hz: Option<f64>,
    pub driver: Option<String>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut TeleopConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(loop_hz) = self.loop_hz {
            config.control.loop_hz = loop_hz;
        }
        if let Some(driver) = &self.driver {
            config.actuator.driver = driver.clone();
        }
    }
}

/// Read `path` (or fall back to defaults), apply overrides, validate.
pub fn load_config(path: &Path, overrides: &ConfigOverrides) -> Result<LoadedConfig, ConfigError> {
    let (mut config, source) = match TeleopConfig::load(path) {
        Ok(config) => (config, ConfigSource::File(path.to_path_buf())),
        Err(ConfigError::FileNotFound) => {
            warn!(
                "Config file {} not found, using built-in defaults",
                path.display()
            );
            (TeleopConfig::default(), ConfigSource::Defaults)
        }
        Err(e) => return Err(e),
    };

    overrides.apply(&mut config);
    config.validate()?;

    info!(
        "Config OK: {}:{} loop_hz={} driver={} idle_zero_s={} deadman_initial={}",
        config.server.host,
        config.server.port,
        config.control.loop_hz,
        config.actuator.driver,
        config.control.idle_zero_s,
        config.control.deadman_initial,
    );
    Ok(LoadedConfig { config, source })
}
