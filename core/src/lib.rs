//! PortPilot Core Library
//!
//! Cross-platform library for finding and stopping the process that holds a
//! listening TCP port.
//! Provides functionality to:
//! - Look up the listener on a single port
//! - Scan every listening TCP port with process details
//! - Terminate a process, escalating once when the first attempt fails
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Pure data models
//! - `ports`: Trait definitions (interfaces)
//! - `adapters`: External tool invocation and output parsing
//! - `application`: Use case services
//!
//! # Platform Support
//! - macOS / Linux: Uses `lsof`, `ps` and POSIX signals
//! - Windows: Uses `netstat`, `wmic`, `tasklist` and `taskkill`

// Hexagonal architecture layers
pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub mod config;
pub mod error;
pub mod platform;

// Re-export domain types (primary API)
pub use domain::{format_memory, Lookup, ProcessDescriptor, ProcessDetails};

// Re-export other commonly used types
pub use application::{FreeOutcome, PortService};
pub use config::Config;
pub use error::{Error, Result};
pub use platform::Platform;
pub use ports::PlatformPort;
