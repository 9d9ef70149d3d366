//! Command execution.
//!
//! `CommandRouter::handle` turns one request into exactly one reply. Every
//! failure, decode or actuator, becomes an error reply; nothing here closes
//! a connection or touches the control loop.

use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use serde_json::{Map, Value, json};
use teleop_common::consts::{REST_POSTURE_SPEED, WAKE_POSTURE_SPEED};
use teleop_common::hal::posture::Posture;
use teleop_common::hal::types::JointGroup;
use teleop_common::protocol::{Reply, Request};
use tracing::{debug, info, warn};

use super::{Command, CommandError};
use crate::link::ActuatorLink;
use crate::state::TeleopState;

/// Executes commands against the shared state and the actuator.
pub struct CommandRouter {
    state: Arc<TeleopState>,
    link: ActuatorLink,
}

impl CommandRouter {
    pub fn new(state: Arc<TeleopState>, link: ActuatorLink) -> Self {
        Self { state, link }
    }

    pub fn state(&self) -> &Arc<TeleopState> {
        &self.state
    }

    /// Process one request into its reply.
    pub async fn handle(&self, request: Request) -> Reply {
        let Request { cmd, rid, args } = request;
        match self.dispatch(&cmd, &args).await {
            Ok(data) => Reply::success(rid, data),
            Err(e) => {
                debug!("Command '{cmd}' failed: {e}");
                Reply::failure(rid, e.to_string())
            }
        }
    }

    /// Decode and execute.
    pub async fn dispatch(
        &self,
        cmd: &str,
        args: &Map<String, Value>,
    ) -> Result<Value, CommandError> {
        let command = Command::decode(cmd, args)?;
        self.execute(command).await
    }

    pub async fn execute(&self, command: Command) -> Result<Value, CommandError> {
        match command {
            Command::Ping => Ok(json!({ "pong": unix_time_s() })),

            Command::Shutdown => {
                if self.state.shutdown.request() {
                    info!("Shutdown requested by client");
                }
                Ok(json!({ "shutting_down": true }))
            }

            Command::Wake => {
                self.link.set_stiffness(JointGroup::Body, 1.0).await?;
                if let Err(e) = self
                    .link
                    .goto_posture(Posture::StandInit, WAKE_POSTURE_SPEED)
                    .await
                {
                    warn!("Wake: posture transition failed (ignored): {e}");
                }
                info!("Robot awake");
                Ok(json!({}))
            }

            Command::Rest => {
                if let Err(e) = self
                    .link
                    .goto_posture(Posture::Crouch, REST_POSTURE_SPEED)
                    .await
                {
                    warn!("Rest: posture transition failed (ignored): {e}");
                }
                self.link.set_stiffness(JointGroup::Body, 0.0).await?;
                info!("Robot resting");
                Ok(json!({}))
            }

            Command::Posture { posture, speed } => {
                self.link.set_stiffness(JointGroup::Body, 1.0).await?;
                self.link.goto_posture(posture, speed).await?;
                info!("Posture {posture} reached");
                Ok(json!({ "name": posture.name(), "speed": speed }))
            }

            Command::SetDeadman { enabled } => {
                if self.state.deadman.set(enabled) != enabled {
                    info!("Deadman {}", if enabled { "enabled" } else { "disabled" });
                }
                Ok(json!({ "enabled": enabled }))
            }

            Command::SetTarget {
                vx,
                vy,
                vw,
                duration_s,
            } => {
                let now = Instant::now();
                let snapshot = {
                    let mut motion = self.state.motion.lock();
                    motion.set_target_at(now, vx, vy, vw, duration_s);
                    motion.snapshot_at(now)
                };
                Ok(snapshot.to_json())
            }

            Command::SetHead(rate) => {
                *self.state.head_command.lock() = rate;
                Ok(json!({ "yaw_n": rate.yaw_n, "pitch_n": rate.pitch_n }))
            }

            Command::CenterHead => {
                self.state.head.lock().center();
                Ok(json!({}))
            }

            Command::Stop => {
                let now = Instant::now();
                let snapshot = {
                    let mut motion = self.state.motion.lock();
                    motion.stop_at(now);
                    motion.snapshot_at(now)
                };
                Ok(snapshot.to_json())
            }

            Command::GetState => Ok(self.state.to_json()),

            Command::Say { text } => {
                if text.trim().is_empty() {
                    return Ok(json!({ "spoken": false }));
                }
                let spoken = match self.link.speak(text).await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!("Speech failed (ignored): {e}");
                        false
                    }
                };
                Ok(json!({ "spoken": spoken }))
            }
        }
    }
}

fn unix_time_s() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
