//! Shared fixture: a running service on 127.0.0.1:0 and a line client.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use teleop_common::control_unit::TeleopConfig;
use teleop_control_unit::service::Service;
use teleop_hal::SimulatedRobot;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

pub fn test_config() -> TeleopConfig {
    let mut config = TeleopConfig::default();
    config.server.host = "127.0.0.1".to_string();
    config.server.port = 0;
    config.server.accept_poll_ms = 50;
    config.server.connection_grace_s = 1.0;
    config.control.loop_hz = 50.0;
    config.control.idle_zero_s = 0.0;
    config
}

pub struct Running {
    pub service: Service,
    pub robot: Arc<SimulatedRobot>,
}

pub async fn start(config: TeleopConfig) -> Running {
    start_with(config, Arc::new(SimulatedRobot::awake())).await
}

/// Start against a robot prepared by the test.
pub async fn start_with(config: TeleopConfig, robot: Arc<SimulatedRobot>) -> Running {
    let service = Service::start(&config, robot.clone()).await.unwrap();
    Running { service, robot }
}

pub struct Client {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Client {
    pub async fn connect(running: &Running) -> Self {
        let stream = TcpStream::connect(running.service.local_addr())
            .await
            .unwrap();
        let (reader, writer) = stream.into_split();
        Self {
            reader: BufReader::new(reader),
            writer,
        }
    }

    pub async fn send_raw(&mut self, bytes: &[u8]) {
        self.writer.write_all(bytes).await.unwrap();
    }

    pub async fn close_write(&mut self) {
        self.writer.shutdown().await.unwrap();
    }

    /// Next reply, or `None` at EOF.
    pub async fn recv(&mut self) -> Option<Value> {
        let mut line = String::new();
        let n = tokio::time::timeout(Duration::from_secs(5), self.reader.read_line(&mut line))
            .await
            .expect("reply timed out")
            .unwrap();
        if n == 0 {
            return None;
        }
        Some(serde_json::from_str(&line).unwrap())
    }

    pub async fn request(&mut self, cmd: &str, rid: u64, args: Value) -> Value {
        let line = format!("{}\n", json!({"cmd": cmd, "rid": rid, "args": args}));
        self.send_raw(line.as_bytes()).await;
        let reply = self.recv().await.expect("connection closed");
        assert_eq!(reply["rid"], json!(rid), "reply out of order: {reply}");
        reply
    }
}
