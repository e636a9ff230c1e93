//! Ports layer - Trait definitions (interfaces).
//!
//! This module defines the interfaces that the application layer uses
//! to interact with the operating system. Implementations live in `adapters`.

mod command;
mod platform;

pub use command::{CommandOutput, CommandRunner};
pub use platform::PlatformPort;
