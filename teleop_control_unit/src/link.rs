//! Timeboxed access to the actuator.
//!
//! Actuator calls are blocking. Each one runs on tokio's blocking pool under
//! a timeout, so a stalled backend costs the caller at most the timebox. A
//! call that times out keeps its blocking thread until the backend returns;
//! those calls stay counted as pending, and once `max_pending` are
//! outstanding new calls fail fast with `ActuatorError::Busy` instead of
//! piling up threads. A panic inside the backend surfaces as
//! `ActuatorError::Panicked`.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use teleop_common::hal::actuator::{Actuator, ActuatorError};
use teleop_common::hal::posture::Posture;
use teleop_common::hal::types::{Joint, JointGroup, Velocity};

/// Decrements the pending counter when the blocking call finishes.
struct PendingGuard(Arc<AtomicUsize>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Cloneable, timeboxed handle to a shared actuator.
#[derive(Clone)]
pub struct ActuatorLink {
    actuator: Arc<dyn Actuator>,
    timeout: Duration,
    max_pending: usize,
    pending: Arc<AtomicUsize>,
}

impl ActuatorLink {
    pub fn new(actuator: Arc<dyn Actuator>, timeout: Duration, max_pending: usize) -> Self {
        Self {
            actuator,
            timeout,
            max_pending: max_pending.max(1),
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.actuator.name()
    }

    /// Calls currently running on the blocking pool, timed out or not.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn call<T, F>(&self, op: &'static str, f: F) -> Result<T, ActuatorError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn Actuator) -> Result<T, ActuatorError> + Send + 'static,
    {
        let pending = self.pending.fetch_add(1, Ordering::AcqRel);
        let guard = PendingGuard(Arc::clone(&self.pending));
        if pending >= self.max_pending {
            return Err(ActuatorError::Busy { op, pending });
        }

        let actuator = Arc::clone(&self.actuator);
        let handle = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            f(actuator.as_ref())
        });

        match tokio::time::timeout(self.timeout, handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(_join_error)) => Err(ActuatorError::Panicked(op)),
            Err(_elapsed) => Err(ActuatorError::Timeout {
                op,
                timeout_ms: self.timeout.as_millis() as u64,
            }),
        }
    }

    pub async fn set_stiffness(&self, group: JointGroup, level: f64) -> Result<(), ActuatorError> {
        self.call("set_stiffness", move |a| a.set_stiffness(group, level))
            .await
    }

    pub async fn set_velocity(&self, velocity: Velocity) -> Result<(), ActuatorError> {
        self.call("set_velocity", move |a| a.set_velocity(velocity))
            .await
    }

    pub async fn set_joint_angles(
        &self,
        joints: &[Joint],
        angles: Vec<f64>,
        speed_fraction: f64,
    ) -> Result<(), ActuatorError> {
        let joints = joints.to_vec();
        self.call("set_joint_angles", move |a| {
            a.set_joint_angles(&joints, &angles, speed_fraction)
        })
        .await
    }

    pub async fn get_joint_angles(&self, joints: &[Joint]) -> Result<Vec<f64>, ActuatorError> {
        let joints = joints.to_vec();
        self.call("get_joint_angles", move |a| a.get_joint_angles(&joints))
            .await
    }

    pub async fn goto_posture(&self, posture: Posture, speed: f64) -> Result<(), ActuatorError> {
        self.call("goto_posture", move |a| a.goto_posture(posture, speed))
            .await
    }

    pub async fn speak(&self, text: String) -> Result<(), ActuatorError> {
        self.call("speak", move |a| a.speak(&text)).await
    }
}
