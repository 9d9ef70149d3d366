//! Safety module root.
//!
//! Deadman gate and process-wide shutdown signalling.

pub mod flags;
