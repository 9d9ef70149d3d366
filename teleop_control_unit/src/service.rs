//! Service assembly and lifecycle.
//!
//! Startup order: shared state, actuator links, head seeding, greeting,
//! listening socket, then the control loop and server tasks. `wait` joins
//! the loop first (its final stop must go out before anything else), speaks
//! the farewell, then joins the server.

use std::net::SocketAddr;
use std::sync::Arc;

use teleop_common::control_unit::TeleopConfig;
use teleop_common::hal::actuator::Actuator;
use teleop_common::hal::types::{HEAD_JOINTS, HeadAngles};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::command::router::CommandRouter;
use crate::cycle::{ControlLoop, LoopStats};
use crate::error::TeleopError;
use crate::link::ActuatorLink;
use crate::server::Server;
use crate::state::TeleopState;

/// Final report of a stopped service.
#[derive(Debug, Clone, Copy)]
pub struct ServiceReport {
    pub loop_stats: LoopStats,
    /// Connections aborted after the grace period.
    pub abandoned_connections: usize,
}

/// A running control unit.
pub struct Service {
    state: Arc<TeleopState>,
    command_link: ActuatorLink,
    local_addr: SocketAddr,
    farewell: String,
    control: JoinHandle<LoopStats>,
    server: JoinHandle<usize>,
}

impl Service {
    /// Bring the control unit up around an already-created actuator.
    pub async fn start(
        config: &TeleopConfig,
        actuator: Arc<dyn Actuator>,
    ) -> Result<Self, TeleopError> {
        let state = Arc::new(TeleopState::new(config));
        let loop_link = ActuatorLink::new(
            Arc::clone(&actuator),
            config.control.actuator_timeout(),
            config.control.max_pending_calls,
        );
        let command_link = ActuatorLink::new(
            actuator,
            config.control.command_timeout(),
            config.control.max_pending_calls,
        );

        let seed = seed_head(&command_link).await;
        state.head.lock().seed(seed);
        let seeded = state.head.lock().angles();
        info!(
            "Head seeded at yaw={:.3} pitch={:.3}",
            seeded.yaw, seeded.pitch
        );

        announce(&command_link, &config.actuator.greeting).await;

        let router = Arc::new(CommandRouter::new(
            Arc::clone(&state),
            command_link.clone(),
        ));
        let server = Server::bind(&config.server, router).await?;
        let local_addr = server.local_addr()?;

        let control = ControlLoop::new(Arc::clone(&state), loop_link, config);
        let control = tokio::spawn(control.run());
        let server = tokio::spawn(server.run());

        info!(
            "Teleop service up on {local_addr} (backend={})",
            command_link.backend_name()
        );
        Ok(Self {
            state,
            command_link,
            local_addr,
            farewell: config.actuator.farewell.clone(),
            control,
            server,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn state(&self) -> &Arc<TeleopState> {
        &self.state
    }

    /// Same effect as the `shutdown` command.
    pub fn request_shutdown(&self) {
        if self.state.shutdown.request() {
            info!("Shutdown requested");
        }
    }

    /// Wait for shutdown to complete.
    pub async fn wait(self) -> Result<ServiceReport, TeleopError> {
        let loop_stats = self.control.await.map_err(|e| TeleopError::Task {
            task: "control loop",
            reason: e.to_string(),
        })?;

        announce(&self.command_link, &self.farewell).await;

        let abandoned_connections = self.server.await.map_err(|e| TeleopError::Task {
            task: "server",
            reason: e.to_string(),
        })?;

        Ok(ServiceReport {
            loop_stats,
            abandoned_connections,
        })
    }
}

/// Current head angles, or (0,0) when they cannot be read.
async fn seed_head(link: &ActuatorLink) -> HeadAngles {
    match link.get_joint_angles(&HEAD_JOINTS).await {
        Ok(angles) if angles.len() == HEAD_JOINTS.len() => HeadAngles {
            yaw: angles[0],
            pitch: angles[1],
        },
        Ok(angles) => {
            warn!(
                "Head seeding: expected {} angles, got {}; using (0, 0)",
                HEAD_JOINTS.len(),
                angles.len()
            );
            HeadAngles::default()
        }
        Err(e) => {
            warn!("Head seeding failed, using (0, 0): {e}");
            HeadAngles::default()
        }
    }
}

async fn announce(link: &ActuatorLink, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Err(e) = link.speak(text.to_string()).await {
        warn!("Announcement failed (ignored): {e}");
    }
}
