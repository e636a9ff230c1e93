//! Domain layer - Pure data models and formatting rules.
//!
//! This module contains the value types every platform variant produces.
//! These types have no I/O dependencies and can be tested in isolation.

mod lookup;
mod process;

// Re-export all domain types
pub use lookup::Lookup;
pub use process::{format_memory, ProcessDescriptor, ProcessDetails, UNKNOWN};
