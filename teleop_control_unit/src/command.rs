//! Command processing root.
//!
//! Inbound requests are decoded at the boundary into the closed [`Command`]
//! set; unrecognized tags are rejected there. [`router::CommandRouter`]
//! executes decoded commands against the shared state and the actuator.

pub mod args;
pub mod router;

use serde_json::{Map, Value};
use teleop_common::consts::DEFAULT_POSTURE_SPEED;
use teleop_common::hal::actuator::ActuatorError;
use teleop_common::hal::posture::Posture;
use thiserror::Error;

use crate::control::head::HeadRateCommand;

/// Why a command failed. The display text becomes the reply `error`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("unknown cmd: {0}")]
    UnknownCommand(String),

    #[error("invalid argument '{name}': {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error("invalid or missing 'name'; allowed: [{}]", Posture::valid_names().join(", "))]
    InvalidPosture,

    #[error(transparent)]
    Actuator(#[from] ActuatorError),
}

/// Every command the server understands.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Ping,
    Shutdown,
    Wake,
    Rest,
    Posture { posture: Posture, speed: f64 },
    SetDeadman { enabled: bool },
    SetTarget {
        vx: f64,
        vy: f64,
        vw: f64,
        duration_s: Option<f64>,
    },
    SetHead(HeadRateCommand),
    CenterHead,
    Stop,
    GetState,
    Say { text: String },
}

impl Command {
    /// Decode a command tag and its arguments.
    ///
    /// Posture names are normalized here, so an invalid name is rejected
    /// before anything touches the actuator.
    pub fn decode(cmd: &str, args: &Map<String, Value>) -> Result<Self, CommandError> {
        let command = match cmd {
            "ping" => Self::Ping,
            "shutdown" => Self::Shutdown,
            "wake" => Self::Wake,
            "rest" => Self::Rest,
            "posture" => {
                let posture = args
                    .get("name")
                    .and_then(Value::as_str)
                    .and_then(Posture::normalize)
                    .ok_or(CommandError::InvalidPosture)?;
                let speed = args::number(args, "speed", DEFAULT_POSTURE_SPEED)?.clamp(0.0, 1.0);
                Self::Posture { posture, speed }
            }
            "set_deadman" => Self::SetDeadman {
                enabled: args::truthy(args.get("enabled")),
            },
            "set_target" => Self::SetTarget {
                vx: args::number(args, "vx_n", 0.0)?,
                vy: args::number(args, "vy_n", 0.0)?,
                vw: args::number(args, "vw_n", 0.0)?,
                duration_s: args::optional_number(args, "duration_s")?,
            },
            "set_head" => Self::SetHead(HeadRateCommand::clipped(
                args::lenient_number(args, "yaw_n"),
                args::lenient_number(args, "pitch_n"),
            )),
            "center_head" => Self::CenterHead,
            "stop" => Self::Stop,
            "get_state" => Self::GetState,
            "say" => Self::Say {
                text: args::text(args, "text"),
            },
            other => return Err(CommandError::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }

    /// Wire tag of this command.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::Shutdown => "shutdown",
            Self::Wake => "wake",
            Self::Rest => "rest",
            Self::Posture { .. } => "posture",
            Self::SetDeadman { .. } => "set_deadman",
            Self::SetTarget { .. } => "set_target",
            Self::SetHead(_) => "set_head",
            Self::CenterHead => "center_head",
            Self::Stop => "stop",
            Self::GetState => "get_state",
            Self::Say { .. } => "say",
        }
    }
}
