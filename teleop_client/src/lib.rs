//! # Teleop Client Library
//!
//! Operator-side pieces of the teleop workspace: named request presets, the
//! stick-to-intent mapping used for streaming, and a line-protocol session
//! over TCP.

pub mod error;
pub mod mapping;
pub mod presets;
pub mod session;

pub use crate::error::ClientError;
pub use crate::session::Session;
