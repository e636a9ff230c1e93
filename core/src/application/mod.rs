//! Application layer - Use case services.
//!
//! Services orchestrate the caller-level sequences (inspect, scan, kill,
//! kill-and-verify) on top of any `PlatformPort` implementation.

mod port_service;

pub use port_service::{FreeOutcome, PortService};
