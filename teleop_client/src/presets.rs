//! Named request presets.

use teleop_common::consts::{DEFAULT_POSTURE_SPEED, REST_POSTURE_SPEED};
use teleop_common::hal::posture::Posture;
use teleop_common::protocol::Request;

use crate::error::ClientError;

/// Every preset name, for help text and error messages.
pub const PRESET_NAMES: [&str; 12] = [
    "ping",
    "wake",
    "rest",
    "stop",
    "stand",
    "crouch",
    "deadman:on",
    "deadman:off",
    "target",
    "center",
    "state",
    "shutdown",
];

/// Velocity arguments for the `target` preset. Missing axes are 0.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TargetArgs {
    pub vx: Option<f64>,
    pub vy: Option<f64>,
    pub vw: Option<f64>,
    pub duration_s: Option<f64>,
}

/// Build the request for a preset name (case-insensitive).
pub fn build(preset: &str, target: &TargetArgs) -> Result<Request, ClientError> {
    let request = match preset.trim().to_ascii_lowercase().as_str() {
        "ping" => Request::new("ping"),
        "wake" => Request::new("wake"),
        "rest" => Request::new("rest"),
        "stop" => Request::new("stop"),
        "stand" => posture(Posture::StandInit, DEFAULT_POSTURE_SPEED),
        "crouch" => posture(Posture::Crouch, REST_POSTURE_SPEED),
        "deadman:on" => Request::new("set_deadman").with_arg("enabled", true),
        "deadman:off" => Request::new("set_deadman").with_arg("enabled", false),
        "target" => {
            let mut request = Request::new("set_target")
                .with_arg("vx_n", target.vx.unwrap_or(0.0))
                .with_arg("vy_n", target.vy.unwrap_or(0.0))
                .with_arg("vw_n", target.vw.unwrap_or(0.0));
            if let Some(duration) = target.duration_s {
                request = request.with_arg("duration_s", duration);
            }
            request
        }
        "center" => Request::new("center_head"),
        "state" => Request::new("get_state"),
        "shutdown" => Request::new("shutdown"),
        _ => return Err(ClientError::UnknownPreset(preset.to_string())),
    };
    Ok(request)
}

fn posture(posture: Posture, speed: f64) -> Request {
    Request::new("posture")
        .with_arg("name", posture.name())
        .with_arg("speed", speed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn every_listed_preset_builds() {
        for name in PRESET_NAMES {
            assert!(build(name, &TargetArgs::default()).is_ok(), "{name}");
        }
    }

    #[test]
    fn stand_and_crouch_are_postures() {
        let stand = build("STAND", &TargetArgs::default()).unwrap();
        assert_eq!(stand.cmd, "posture");
        assert_eq!(stand.args["name"], json!("StandInit"));
        assert_eq!(stand.args["speed"], json!(0.7));

        let crouch = build("crouch", &TargetArgs::default()).unwrap();
        assert_eq!(crouch.args["name"], json!("Crouch"));
    }

    #[test]
    fn target_defaults_to_zero_without_duration() {
        let request = build("target", &TargetArgs::default()).unwrap();
        assert_eq!(request.cmd, "set_target");
        assert_eq!(request.args["vx_n"], json!(0.0));
        assert!(!request.args.contains_key("duration_s"));

        let request = build(
            "target",
            &TargetArgs {
                vx: Some(0.4),
                duration_s: Some(1.5),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(request.args["vx_n"], json!(0.4));
        assert_eq!(request.args["duration_s"], json!(1.5));
    }

    #[test]
    fn deadman_presets() {
        let on = build("deadman:on", &TargetArgs::default()).unwrap();
        assert_eq!(on.args["enabled"], json!(true));
        let off = build("deadman:off", &TargetArgs::default()).unwrap();
        assert_eq!(off.args["enabled"], json!(false));
    }

    #[test]
    fn unknown_preset_exits_with_two() {
        let err = build("moonwalk", &TargetArgs::default()).unwrap_err();
        assert_eq!(err.to_string(), "unknown preset: moonwalk");
        assert_eq!(err.exit_code(), 2);
    }
}
