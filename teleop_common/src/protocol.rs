//! Line-delimited JSON session protocol.
//!
//! One JSON object per line in each direction:
//!
//! ```text
//! → {"cmd": "set_target", "rid": 7, "args": {"vx_n": 0.5}}
//! ← {"ok": true, "rid": 7, "data": {...}}
//! ← {"ok": false, "rid": 7, "error": "unknown cmd: dance"}
//! ```
//!
//! `rid` is opaque and echoed verbatim (`null` when absent). Framing itself
//! (buffering partial reads, trailing record at EOF) is done by the transport
//! with a buffered line reader; this module only decodes and encodes records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Why a record could not be turned into a [`Request`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProtocolError {
    /// Not valid JSON.
    #[error("invalid request: {0}")]
    Malformed(String),

    /// Valid JSON but not an object.
    #[error("invalid request: expected a JSON object")]
    NotAnObject,

    /// `cmd` missing or not a string.
    #[error("invalid request: missing or non-string 'cmd'")]
    MissingCommand,

    /// `args` present but not an object.
    #[error("invalid request: 'args' must be an object")]
    InvalidArgs,

    /// Record longer than the configured limit.
    #[error("record exceeds {limit} bytes")]
    LineTooLong {
        /// Configured limit [bytes].
        limit: usize,
    },

    /// Serialization of an outgoing record failed.
    #[error("encode failed: {0}")]
    Encode(String),
}

/// A decoded request envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Command tag.
    pub cmd: String,
    /// Opaque request id.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub rid: Value,
    /// Command arguments.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub args: Map<String, Value>,
}

/// A record that failed to decode, with whatever `rid` could be recovered.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRequest {
    /// Recovered request id, `null` if none.
    pub rid: Value,
    /// Decode failure.
    pub reason: ProtocolError,
}

impl RejectedRequest {
    /// Failure reply for the peer.
    pub fn into_reply(self) -> Reply {
        Reply::failure(self.rid, self.reason.to_string())
    }
}

impl Request {
    /// Request with no id and no arguments.
    pub fn new(cmd: impl Into<String>) -> Self {
        Self {
            cmd: cmd.into(),
            rid: Value::Null,
            args: Map::new(),
        }
    }

    /// Attach a request id.
    pub fn with_rid(mut self, rid: impl Into<Value>) -> Self {
        self.rid = rid.into();
        self
    }

    /// Attach one argument.
    pub fn with_arg(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.args.insert(key.to_string(), value.into());
        self
    }

    /// Decode one record (without its trailing newline).
    pub fn decode(line: &str) -> Result<Self, RejectedRequest> {
        let value: Value = serde_json::from_str(line.trim()).map_err(|e| RejectedRequest {
            rid: Value::Null,
            reason: ProtocolError::Malformed(e.to_string()),
        })?;

        let Value::Object(mut obj) = value else {
            return Err(RejectedRequest {
                rid: Value::Null,
                reason: ProtocolError::NotAnObject,
            });
        };

        let rid = obj.remove("rid").unwrap_or(Value::Null);
        let reject = |reason| RejectedRequest {
            rid: rid.clone(),
            reason,
        };

        let cmd = match obj.remove("cmd") {
            Some(Value::String(cmd)) => cmd,
            _ => return Err(reject(ProtocolError::MissingCommand)),
        };

        let args = match obj.remove("args") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(args)) => args,
            Some(_) => return Err(reject(ProtocolError::InvalidArgs)),
        };

        Ok(Self { cmd, rid, args })
    }
}

/// A reply envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    /// Success flag.
    pub ok: bool,
    /// Echoed request id.
    #[serde(default)]
    pub rid: Value,
    /// Payload on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Message on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Reply {
    /// Successful reply carrying `data`.
    pub fn success(rid: Value, data: Value) -> Self {
        Self {
            ok: true,
            rid,
            data: Some(data),
            error: None,
        }
    }

    /// Failed reply carrying `error`.
    pub fn failure(rid: Value, error: impl Into<String>) -> Self {
        Self {
            ok: false,
            rid,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Decode a reply record.
    pub fn decode(line: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(line.trim()).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }
}

/// Encode any envelope as one newline-terminated record.
pub fn encode_line<T: Serialize>(record: &T) -> Result<String, ProtocolError> {
    let mut line = serde_json::to_string(record).map_err(|e| ProtocolError::Encode(e.to_string()))?;
    line.push('\n');
    Ok(line)
}
