//! Motion shaping root.
//!
//! Slew limiting, target arbitration and head rate integration. Pure
//! computation; no I/O and no locking.

pub mod arbiter;
pub mod head;
pub mod slew;
