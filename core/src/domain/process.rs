//! Process descriptor domain model.

use serde::{Deserialize, Serialize};

/// Placeholder used when a process could not be enriched.
pub const UNKNOWN: &str = "unknown";

// ============================================================================
// ProcessDetails
// ============================================================================

/// Enrichment data for a single PID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDetails {
    /// Short process/image name (no path, no extension).
    pub name: String,
    /// Full command line; the name when nothing better is known.
    pub command: String,
    /// Resident memory in bytes, `0` when unknown.
    pub memory: u64,
    /// Formatted uptime such as "2h 14m", empty when unknown.
    pub uptime: String,
}

impl ProcessDetails {
    /// Details for a PID that no tool could describe.
    pub fn placeholder() -> Self {
        Self {
            name: UNKNOWN.to_string(),
            command: UNKNOWN.to_string(),
            memory: 0,
            uptime: String::new(),
        }
    }

    /// Details that only carry a name, e.g. when the detail tool failed.
    pub fn name_only(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            command: name.clone(),
            name,
            memory: 0,
            uptime: String::new(),
        }
    }
}

// ============================================================================
// ProcessDescriptor
// ============================================================================

/// The process holding a listening TCP socket on a port.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessDescriptor {
    /// The port number (e.g., 3000, 8080).
    pub port: u16,
    /// Process ID of the listener. Never zero.
    pub pid: u32,
    /// Short process/image name.
    pub name: String,
    /// Best-effort full invocation string.
    pub command: String,
    /// Resident memory in bytes, `0` when unknown.
    pub memory: u64,
    /// Formatted uptime, empty when unknown.
    pub uptime: String,
}

impl ProcessDescriptor {
    /// Combine a `(port, pid)` pair with its enrichment data.
    ///
    /// An empty command falls back to the process name.
    pub fn new(port: u16, pid: u32, details: ProcessDetails) -> Self {
        let ProcessDetails {
            name,
            command,
            memory,
            uptime,
        } = details;
        let command = if command.trim().is_empty() {
            name.clone()
        } else {
            command
        };

        Self {
            port,
            pid,
            name,
            command,
            memory,
            uptime,
        }
    }

    /// Get the formatted port number for display (e.g., ":3000").
    pub fn display_port(&self) -> String {
        format!(":{}", self.port)
    }

    /// Human readable resident memory (e.g., "512MB").
    pub fn display_memory(&self) -> String {
        format_memory(self.memory)
    }
}

impl std::fmt::Display for ProcessDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (PID: {}, Port: {})", self.name, self.pid, self.port)
    }
}

/// Format a byte count the way the port table shows it.
///
/// `0` means unknown and renders as a dash. Values of 1024 MB and above are
/// shown in gigabytes with one decimal, everything else in whole megabytes.
pub fn format_memory(bytes: u64) -> String {
    if bytes == 0 {
        return "\u{2013}".to_string();
    }

    let mb = bytes as f64 / (1024.0 * 1024.0);
    if mb >= 1024.0 {
        format!("{:.1}GB", mb / 1024.0)
    } else {
        format!("{}MB", mb.round() as u64)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: u64 = 1024 * 1024;

    #[test]
    fn test_format_memory_staircase() {
        assert_eq!(format_memory(0), "–");
        assert_eq!(format_memory(500 * MIB), "500MB");
        assert_eq!(format_memory(1024 * MIB), "1.0GB");
        assert_eq!(format_memory(1536 * MIB), "1.5GB");
    }

    #[test]
    fn test_format_memory_rounds_megabytes() {
        assert_eq!(format_memory(MIB / 4), "0MB");
        assert_eq!(format_memory(MIB + MIB / 2), "2MB");
        assert_eq!(format_memory(1023 * MIB), "1023MB");
    }

    #[test]
    fn test_descriptor_command_falls_back_to_name() {
        let details = ProcessDetails {
            name: "node".to_string(),
            command: "  ".to_string(),
            memory: 0,
            uptime: String::new(),
        };
        let descriptor = ProcessDescriptor::new(3000, 1234, details);
        assert_eq!(descriptor.command, "node");
        assert_eq!(descriptor.display_port(), ":3000");
        assert_eq!(descriptor.display_memory(), "–");
    }

    #[test]
    fn test_placeholder() {
        let details = ProcessDetails::placeholder();
        assert_eq!(details.name, "unknown");
        assert_eq!(details.command, "unknown");
        assert_eq!(details.memory, 0);
        assert!(details.uptime.is_empty());
    }

    #[test]
    fn test_serialized_field_names() {
        let descriptor = ProcessDescriptor::new(8080, 42, ProcessDetails::name_only("nginx"));
        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["port"], 8080);
        assert_eq!(json["pid"], 42);
        assert_eq!(json["name"], "nginx");
        assert_eq!(json["command"], "nginx");
        assert_eq!(json["memory"], 0);
        assert_eq!(json["uptime"], "");
    }
}
