//! One client session.
//!
//! Records are read one at a time and answered before the next is read, so
//! replies leave in request order. A record cut off by EOF still counts if
//! it holds non-whitespace content. Blank records get no reply. An oversized
//! record is dropped up to its newline and answered with an error.

use std::net::SocketAddr;
use std::sync::Arc;

use teleop_common::protocol::{ProtocolError, Reply, Request, encode_line};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::command::router::CommandRouter;

/// Outcome of reading one record.
#[derive(Debug, PartialEq, Eq)]
pub enum Record {
    /// A complete or EOF-terminated record, newline stripped.
    Line(Vec<u8>),
    /// Longer than the limit; its bytes were discarded through the newline.
    TooLong,
    /// Peer closed with nothing pending.
    Eof,
}

/// Read the next record of at most `max_bytes` (excluding the newline).
pub async fn read_record<R>(reader: &mut R, max_bytes: usize) -> std::io::Result<Record>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let limit = max_bytes as u64 + 1;
    let n = (&mut *reader).take(limit).read_until(b'\n', &mut buf).await?;
    if n == 0 {
        return Ok(Record::Eof);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    } else if buf.len() > max_bytes {
        skip_to_newline(reader).await?;
        return Ok(Record::TooLong);
    }
    Ok(Record::Line(buf))
}

/// Drop buffered input up to and including the next newline, or to EOF.
async fn skip_to_newline<R>(reader: &mut R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let (used, found) = {
            let chunk = reader.fill_buf().await?;
            if chunk.is_empty() {
                return Ok(());
            }
            match chunk.iter().position(|&b| b == b'\n') {
                Some(i) => (i + 1, true),
                None => (chunk.len(), false),
            }
        };
        reader.consume(used);
        if found {
            return Ok(());
        }
    }
}

/// Serve one accepted connection until EOF, error, or shutdown.
pub async fn serve(
    stream: TcpStream,
    peer: SocketAddr,
    router: Arc<CommandRouter>,
    max_line_bytes: usize,
) {
    info!("Client connected: {peer}");
    let (reader, writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    run_session(&mut reader, writer, &router, max_line_bytes, peer).await;
    info!("Client disconnected: {peer}");
}

/// The session loop, generic over the transport.
pub async fn run_session<R, W>(
    reader: &mut R,
    mut writer: W,
    router: &CommandRouter,
    max_line_bytes: usize,
    peer: SocketAddr,
) where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let shutdown = &router.state().shutdown;

    loop {
        let record = tokio::select! {
            record = read_record(reader, max_line_bytes) => record,
            _ = shutdown.wait() => {
                debug!("{peer}: closing for shutdown");
                break;
            }
        };

        let reply = match record {
            Ok(Record::Eof) => break,
            Ok(Record::TooLong) => {
                warn!("{peer}: dropped record over {max_line_bytes} bytes");
                Reply::failure(
                    serde_json::Value::Null,
                    ProtocolError::LineTooLong {
                        limit: max_line_bytes,
                    }
                    .to_string(),
                )
            }
            Ok(Record::Line(bytes)) => match std::str::from_utf8(&bytes) {
                Ok(text) if text.trim().is_empty() => continue,
                Ok(text) => match Request::decode(text) {
                    Ok(request) => router.handle(request).await,
                    Err(rejected) => {
                        debug!("{peer}: rejected record: {}", rejected.reason);
                        rejected.into_reply()
                    }
                },
                Err(_) => Reply::failure(
                    serde_json::Value::Null,
                    ProtocolError::Malformed("record is not valid UTF-8".to_string()).to_string(),
                ),
            },
            Err(e) => {
                debug!("{peer}: read failed: {e}");
                break;
            }
        };

        if send(&mut writer, &reply, peer).await.is_err() {
            break;
        }
    }

    let _ = writer.shutdown().await;
}

async fn send<W: AsyncWrite + Unpin>(writer: &mut W, reply: &Reply, peer: SocketAddr) -> Result<(), ()> {
    let line = match encode_line(reply) {
        Ok(line) => line,
        Err(e) => {
            warn!("{peer}: {e}");
            return Err(());
        }
    };
    if let Err(e) = writer.write_all(line.as_bytes()).await {
        debug!("{peer}: write failed: {e}");
        return Err(());
    }
    Ok(())
}
