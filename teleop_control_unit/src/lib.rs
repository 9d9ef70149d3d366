//! # Teleop Control Unit Library
//!
//! Command arbitration and motion smoothing for a teleoperated legged robot.
//! Clients send line-delimited JSON commands over TCP; a fixed-rate control
//! loop turns the resulting normalized intents into bounded-acceleration
//! actuator commands.
//!
//! ## Layers
//!
//! 1. **Control**: `SlewLimiter`, `MotionTargetArbiter`, `HeadTargetIntegrator`
//! 2. **Safety**: deadman gate, shutdown flag
//! 3. **State**: the shared component set injected into both sides
//! 4. **Command**: request decode and execution (`CommandRouter`)
//! 5. **Cycle**: the fixed-rate loop (`ControlLoop`)
//! 6. **Server / Service**: TCP sessions and lifecycle
//!
//! ## Loop Contract
//!
//! Nothing that happens inside a tick can stop the loop. Actuator calls are
//! timeboxed and their failures are logged and dropped. On shutdown the loop
//! sends exactly one final zero velocity.

pub mod command;
pub mod config;
pub mod control;
pub mod cycle;
pub mod error;
pub mod link;
pub mod safety;
pub mod server;
pub mod service;
pub mod state;
