//! Adapters layer - OS-facing implementations.
//!
//! This module contains the implementations of the port traits defined in
//! `ports`: the system command runner, the tool-output parsers and the two
//! platform variants built on them.

pub mod command;
pub mod parsers;
pub mod unix;
pub mod windows;

// Re-export main types for convenience
pub use command::SystemRunner;
pub use unix::UnixPlatform;
pub use windows::WindowsPlatform;
