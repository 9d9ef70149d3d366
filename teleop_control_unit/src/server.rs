//! TCP session server.
//!
//! One accept task, one tokio task per connection. On shutdown the listener
//! is dropped, connection tasks get `connection_grace_s` to finish, and any
//! still running after that are aborted.

pub mod connection;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use teleop_common::control_unit::ServerConfig;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::command::router::CommandRouter;

/// Accepting half of the session server.
pub struct Server {
    listener: TcpListener,
    router: Arc<CommandRouter>,
    accept_poll: Duration,
    grace: Duration,
    max_line_bytes: usize,
}

impl Server {
    /// Bind the listening socket. Port 0 picks an ephemeral port.
    pub async fn bind(config: &ServerConfig, router: Arc<CommandRouter>) -> std::io::Result<Self> {
        let listener = TcpListener::bind(config.bind_address()).await?;
        info!("Listening on {}", listener.local_addr()?);
        Ok(Self {
            listener,
            router,
            accept_poll: Duration::from_millis(config.accept_poll_ms),
            grace: Duration::from_secs_f64(config.connection_grace_s),
            max_line_bytes: config.max_line_bytes,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept until shutdown, then drain connections. Returns how many
    /// connections had to be abandoned.
    pub async fn run(self) -> usize {
        let Self {
            listener,
            router,
            accept_poll,
            grace,
            max_line_bytes,
        } = self;
        let state = Arc::clone(router.state());
        let mut connections = JoinSet::new();

        while !state.shutdown.is_requested() {
            let accepted = tokio::select! {
                _ = state.shutdown.wait() => break,
                accepted = tokio::time::timeout(accept_poll, listener.accept()) => accepted,
            };

            while connections.try_join_next().is_some() {}

            match accepted {
                Ok(Ok((stream, peer))) => {
                    if let Err(e) = stream.set_nodelay(true) {
                        debug!("{peer}: set_nodelay failed: {e}");
                    }
                    connections.spawn(connection::serve(
                        stream,
                        peer,
                        Arc::clone(&router),
                        max_line_bytes,
                    ));
                }
                Ok(Err(e)) => warn!("Accept failed: {e}"),
                Err(_poll_elapsed) => {}
            }
        }

        drop(listener);
        info!(
            "Server stopped accepting; draining {} connection(s)",
            connections.len()
        );

        let drained = tokio::time::timeout(grace, async {
            while connections.join_next().await.is_some() {}
        })
        .await;

        let abandoned = connections.len();
        if drained.is_err() && abandoned > 0 {
            warn!("{abandoned} connection(s) still open after {grace:?} grace period, aborting");
            connections.abort_all();
        }
        abandoned
    }
}
