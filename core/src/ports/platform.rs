//! Platform capability port (interface).

use crate::domain::{Lookup, ProcessDescriptor};

/// The three operations every platform variant provides.
///
/// The `find_*`/`scan_*` methods return the explicit [`Lookup`] outcome; the
/// default-provided `lookup_port` and `list_listening` collapse it to the
/// observed contract where absence and failure look the same.
pub trait PlatformPort: Send + Sync {
    /// Find the process holding a listening TCP socket on `port`.
    fn find_listener(
        &self,
        port: u16,
    ) -> impl std::future::Future<Output = Lookup<ProcessDescriptor>> + Send;

    /// Describe every listening TCP port, ascending, one entry per port.
    fn scan_listeners(
        &self,
    ) -> impl std::future::Future<Output = Lookup<Vec<ProcessDescriptor>>> + Send;

    /// Terminate a process, escalating once if the first attempt fails.
    ///
    /// Returns `true` if a termination request was delivered.
    fn terminate(&self, pid: u32, force: bool) -> impl std::future::Future<Output = bool> + Send;

    /// Single-port lookup; `None` for a free port and for any tool failure.
    fn lookup_port(
        &self,
        port: u16,
    ) -> impl std::future::Future<Output = Option<ProcessDescriptor>> + Send {
        async move { self.find_listener(port).await.found() }
    }

    /// Full scan; empty when nothing listens or when the scan failed.
    fn list_listening(
        &self,
    ) -> impl std::future::Future<Output = Vec<ProcessDescriptor>> + Send {
        async move { self.scan_listeners().await.found_or_empty() }
    }
}

impl<T: PlatformPort> PlatformPort for &T {
    fn find_listener(
        &self,
        port: u16,
    ) -> impl std::future::Future<Output = Lookup<ProcessDescriptor>> + Send {
        (**self).find_listener(port)
    }

    fn scan_listeners(
        &self,
    ) -> impl std::future::Future<Output = Lookup<Vec<ProcessDescriptor>>> + Send {
        (**self).scan_listeners()
    }

    fn terminate(&self, pid: u32, force: bool) -> impl std::future::Future<Output = bool> + Send {
        (**self).terminate(pid, force)
    }
}
