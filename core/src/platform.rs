//! Platform selection.
//!
//! The variant is chosen from the OS identity once per process and kept in a
//! process-wide cell that is never mutated afterwards.

use std::sync::OnceLock;

use tracing::debug;

use crate::adapters::{SystemRunner, UnixPlatform, WindowsPlatform};
use crate::config::Config;
use crate::domain::{Lookup, ProcessDescriptor};
use crate::error::{Error, Result};
use crate::ports::PlatformPort;

static PLATFORM: OnceLock<Platform> = OnceLock::new();

/// The platform variant for the running OS.
#[derive(Debug)]
pub enum Platform {
    /// macOS and Linux: `lsof`, `ps`, signals.
    Unix(UnixPlatform<SystemRunner>),
    /// Windows: `netstat`, `wmic`, `tasklist`, `taskkill`.
    Windows(WindowsPlatform<SystemRunner>),
}

impl Platform {
    /// Select the variant for the running OS.
    pub fn detect(config: &Config) -> Result<Self> {
        Self::for_os(std::env::consts::OS, config)
    }

    /// Select the variant for an OS name as reported by
    /// `std::env::consts::OS`.
    pub fn for_os(os: &str, config: &Config) -> Result<Self> {
        let runner = SystemRunner::from_config(config);
        match os {
            "macos" | "linux" => Ok(Platform::Unix(UnixPlatform::new(runner))),
            "windows" => Ok(Platform::Windows(WindowsPlatform::new(runner))),
            other => Err(Error::UnsupportedPlatform(other.to_string())),
        }
    }

    /// Short name of the variant.
    pub fn name(&self) -> &'static str {
        match self {
            Platform::Unix(_) => "unix",
            Platform::Windows(_) => "windows",
        }
    }
}

impl PlatformPort for Platform {
    async fn find_listener(&self, port: u16) -> Lookup<ProcessDescriptor> {
        match self {
            Platform::Unix(p) => p.find_listener(port).await,
            Platform::Windows(p) => p.find_listener(port).await,
        }
    }

    async fn scan_listeners(&self) -> Lookup<Vec<ProcessDescriptor>> {
        match self {
            Platform::Unix(p) => p.scan_listeners().await,
            Platform::Windows(p) => p.scan_listeners().await,
        }
    }

    async fn terminate(&self, pid: u32, force: bool) -> bool {
        match self {
            Platform::Unix(p) => p.terminate(pid, force).await,
            Platform::Windows(p) => p.terminate(pid, force).await,
        }
    }
}

/// The process-wide platform, selected on first use.
///
/// `config` only matters for the call that performs the selection; an
/// unrecognized OS is an error every time.
pub fn global(config: &Config) -> Result<&'static Platform> {
    if let Some(platform) = PLATFORM.get() {
        return Ok(platform);
    }

    let platform = Platform::detect(config)?;
    debug!(platform = platform.name(), "Selected platform");
    Ok(PLATFORM.get_or_init(|| platform))
}
