//! Deadman and shutdown flags.
//!
//! Both are plain atomics re-polled by the control loop every tick. The
//! shutdown flag also carries a `Notify` so the accept loop, connection
//! tasks and the loop's pacing sleep wake as soon as it is raised.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// Locomotion gate. While disabled the loop commands zero velocity.
#[derive(Debug, Default)]
pub struct DeadmanFlag {
    enabled: AtomicBool,
}

impl DeadmanFlag {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Set the flag, returning the previous value.
    pub fn set(&self, enabled: bool) -> bool {
        self.enabled.swap(enabled, Ordering::AcqRel)
    }
}

/// Process-wide, one-way shutdown request.
#[derive(Debug, Default)]
pub struct ShutdownFlag {
    requested: AtomicBool,
    notify: Notify,
}

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag and wake every waiter. Returns `true` on the first call.
    pub fn request(&self) -> bool {
        let first = !self.requested.swap(true, Ordering::AcqRel);
        self.notify.notify_waiters();
        first
    }

    #[inline]
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// Resolve once shutdown has been requested.
    pub async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register before checking so a request in between is not missed.
            notified.as_mut().enable();
            if self.is_requested() {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn deadman_set_returns_previous() {
        let flag = DeadmanFlag::new(false);
        assert!(!flag.set(true));
        assert!(flag.is_enabled());
        assert!(flag.set(false));
        assert!(!flag.is_enabled());
    }

    #[test]
    fn shutdown_request_is_one_way() {
        let flag = ShutdownFlag::new();
        assert!(!flag.is_requested());
        assert!(flag.request());
        assert!(!flag.request());
        assert!(flag.is_requested());
    }

    #[tokio::test]
    async fn wait_returns_immediately_when_already_requested() {
        let flag = ShutdownFlag::new();
        flag.request();
        tokio::time::timeout(Duration::from_millis(100), flag.wait())
            .await
            .expect("wait should resolve");
    }

    #[tokio::test]
    async fn wait_wakes_on_request() {
        let flag = Arc::new(ShutdownFlag::new());
        let waiter = {
            let flag = Arc::clone(&flag);
            tokio::spawn(async move { flag.wait().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        flag.request();
        tokio::time::timeout(Duration::from_millis(500), waiter)
            .await
            .expect("waiter should wake")
            .unwrap();
    }
}
