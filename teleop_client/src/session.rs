//! Client side of the line protocol.
//!
//! One request in flight at a time: `request` writes a record and waits for
//! the next reply record. A reply cut off by EOF is still decoded; EOF with
//! nothing buffered is `ClientError::Closed`.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use teleop_common::protocol::{ProtocolError, Reply, Request, encode_line};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tracing::debug;

use crate::error::ClientError;

/// An open session with the control unit.
pub struct Session {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    next_rid: u64,
}

impl Session {
    /// Connect with a bounded wait.
    pub async fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self, ClientError> {
        let addr = format!("{host}:{port}");
        let stream = match tokio::time::timeout(timeout, TcpStream::connect(&addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                return Err(ClientError::Connect {
                    addr,
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                return Err(ClientError::Connect {
                    addr,
                    reason: format!("timed out after {timeout:?}"),
                });
            }
        };
        stream.set_nodelay(true)?;
        debug!("Connected to {addr}");

        let (reader, writer) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(reader),
            writer,
            next_rid: 1,
        })
    }

    /// Send a request, stamping a fresh numeric `rid` if it has none.
    pub async fn request(&mut self, mut request: Request) -> Result<Reply, ClientError> {
        if request.rid.is_null() {
            request.rid = Value::from(self.next_rid);
            self.next_rid += 1;
        }
        self.send(&request).await?;
        let line = self.recv_line().await?;
        Ok(Reply::decode(&line)?)
    }

    /// Send an arbitrary JSON value as one record and return the raw reply.
    pub async fn request_raw(&mut self, value: &Value) -> Result<Value, ClientError> {
        self.send(value).await?;
        let line = self.recv_line().await?;
        serde_json::from_str(line.trim())
            .map_err(|e| ClientError::Protocol(ProtocolError::Malformed(e.to_string())))
    }

    async fn send<T: Serialize>(&mut self, record: &T) -> Result<(), ClientError> {
        let line = encode_line(record)?;
        self.writer.write_all(line.as_bytes()).await?;
        Ok(())
    }

    async fn recv_line(&mut self) -> Result<String, ClientError> {
        loop {
            let mut line = String::new();
            let n = self.reader.read_line(&mut line).await?;
            if n == 0 {
                return Err(ClientError::Closed);
            }
            if !line.trim().is_empty() {
                return Ok(line);
            }
        }
    }

    /// Half-close, letting the server finish and close its side.
    pub async fn close(mut self) -> Result<(), ClientError> {
        self.writer.shutdown().await?;
        Ok(())
    }
}
