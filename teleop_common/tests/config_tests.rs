//! Config file loading tests.
//!
//! Load `TeleopConfig` from real files on disk: full documents, sparse
//! documents, unknown keys and out-of-range values.

use std::fs;

use teleop_common::config::{ConfigError, ConfigLoader, LogLevel};
use teleop_common::control_unit::TeleopConfig;
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("teleop.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn full_document_loads_and_validates() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[shared]
log_level = "debug"
service_name = "teleop-lab"

[server]
host = "127.0.0.1"
port = 40200
accept_poll_ms = 250
connection_grace_s = 1.0
max_line_bytes = 4096

[control]
loop_hz = 50.0
max_acc_vx = 2.0
max_acc_vy = 1.0
max_acc_vw = 4.0
idle_zero_s = 0.0
deadman_initial = true
actuator_timeout_ms = 80
max_pending_calls = 2

[head]
yaw_min = -1.0
yaw_max = 1.0
pitch_min = -0.5
pitch_max = 0.4
max_yaw_rate = 2.0
max_pitch_rate = 1.5
fraction_speed = 0.5

[actuator]
driver = "simulation"
robot_host = "nao.local"
robot_port = 9559
greeting = ""
farewell = "Bye."
"#,
    );

    let config = TeleopConfig::load(&path).unwrap();
    config.validate().unwrap();

    assert_eq!(config.shared.log_level, LogLevel::Debug);
    assert_eq!(config.shared.service_name, "teleop-lab");
    assert_eq!(config.server.bind_address(), "127.0.0.1:40200");
    assert_eq!(config.server.max_line_bytes, 4096);
    assert_eq!(config.control.loop_hz, 50.0);
    assert!(config.control.deadman_initial);
    assert_eq!(config.control.idle_zero_s, 0.0);
    assert_eq!(config.head.yaw_max, 1.0);
    assert_eq!(config.actuator.robot_host, "nao.local");
    assert!(config.actuator.greeting.is_empty());
}

#[test]
fn sparse_document_fills_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[server]\nport = 0\n");

    let config = TeleopConfig::load(&path).unwrap();
    config.validate().unwrap();

    assert_eq!(config.server.port, 0);
    assert_eq!(config.control.loop_hz, 20.0);
    assert_eq!(config.control.actuator_timeout_ms, 150);
    assert_eq!(config.head.fraction_speed, 0.3);
    assert_eq!(config.actuator.driver, "simulation");
}

#[test]
fn missing_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let result = TeleopConfig::load(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::FileNotFound)));
}

#[test]
fn unknown_section_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[gamepad]\ndeadzone = 0.1\n");
    assert!(matches!(
        TeleopConfig::load(&path),
        Err(ConfigError::ParseError(_))
    ));
}

#[test]
fn wrong_type_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[control]\nloop_hz = \"fast\"\n");
    assert!(matches!(
        TeleopConfig::load(&path),
        Err(ConfigError::ParseError(_))
    ));
}

#[test]
fn out_of_range_values_fail_validation() {
    let dir = TempDir::new().unwrap();
    for doc in [
        "[control]\nloop_hz = 1000.0\n",
        "[control]\nmax_pending_calls = 0\n",
        "[control]\nidle_zero_s = -1.0\n",
        "[server]\nmax_line_bytes = 10\n",
        "[server]\nconnection_grace_s = 99.0\n",
        "[head]\nyaw_min = 1.0\nyaw_max = 0.5\n",
        "[head]\nmax_pitch_rate = -1.0\n",
        "[actuator]\ndriver = \"\"\n",
        "[shared]\nservice_name = \"\"\n",
    ] {
        let path = write_config(&dir, doc);
        let config = TeleopConfig::load(&path).unwrap();
        assert!(
            matches!(config.validate(), Err(ConfigError::ValidationError(_))),
            "expected validation failure for {doc:?}"
        );
    }
}

#[test]
fn shipped_sample_matches_defaults() {
    let sample = TeleopConfig::from_toml(include_str!("../../config/teleop.toml")).unwrap();
    sample.validate().unwrap();
    let defaults = TeleopConfig::default();
    assert_eq!(sample.server.port, defaults.server.port);
    assert_eq!(sample.control.loop_hz, defaults.control.loop_hz);
    assert_eq!(sample.control.command_timeout_ms, defaults.control.command_timeout_ms);
    assert_eq!(sample.head.pitch_min, defaults.head.pitch_min);
    assert_eq!(sample.actuator.farewell, defaults.actuator.farewell);
}
