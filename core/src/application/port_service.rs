//! Port inspection and termination service.

use std::time::Duration;

use tracing::{debug, info};

use crate::config::Config;
use crate::domain::ProcessDescriptor;
use crate::ports::PlatformPort;

/// Result of a kill-and-verify sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FreeOutcome {
    /// Nothing was listening on the port to begin with.
    AlreadyFree,
    /// The listener was terminated and the port is no longer in use.
    Freed(ProcessDescriptor),
    /// The kill was delivered but something still listens on the port.
    StillInUse {
        killed: ProcessDescriptor,
        holder: ProcessDescriptor,
    },
    /// The termination request could not be delivered.
    KillFailed(ProcessDescriptor),
}

/// Application service for "what is on port X, and can I kill it".
///
/// This service uses the `PlatformPort` trait for every OS interaction,
/// allowing different implementations to be injected.
pub struct PortService<P: PlatformPort> {
    platform: P,
    free_check_delay: Duration,
}

impl<P: PlatformPort> PortService<P> {
    /// Create a new service with an explicit post-kill delay.
    pub fn new(platform: P, free_check_delay: Duration) -> Self {
        Self {
            platform,
            free_check_delay,
        }
    }

    /// Create a new service using the configured post-kill delay.
    pub fn with_config(platform: P, config: &Config) -> Self {
        Self::new(platform, config.free_check_delay())
    }

    /// The underlying platform capability.
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Describe the listener on a port, if any.
    pub async fn inspect(&self, port: u16) -> Option<ProcessDescriptor> {
        self.platform.lookup_port(port).await
    }

    /// Describe every listening port, ascending.
    pub async fn scan(&self) -> Vec<ProcessDescriptor> {
        self.platform.list_listening().await
    }

    /// Terminate the process behind a descriptor.
    pub async fn kill(&self, target: &ProcessDescriptor, force: bool) -> bool {
        debug!(port = target.port, pid = target.pid, force = force, "Killing listener");
        self.platform.terminate(target.pid, force).await
    }

    /// Wait for socket teardown, then report whoever still holds the port.
    pub async fn verify_free(&self, port: u16) -> Option<ProcessDescriptor> {
        tokio::time::sleep(self.free_check_delay).await;
        self.platform.lookup_port(port).await
    }

    /// Kill the listener on a port and verify the port was released.
    pub async fn free_port(&self, port: u16, force: bool) -> FreeOutcome {
        match self.inspect(port).await {
            Some(target) => self.free_listener(target, force).await,
            None => FreeOutcome::AlreadyFree,
        }
    }

    /// Kill an already resolved listener and verify its port was released.
    ///
    /// Unlike [`PortService::free_port`] this does not look the port up
    /// first, so it never reports `AlreadyFree`.
    pub async fn free_listener(&self, target: ProcessDescriptor, force: bool) -> FreeOutcome {
        if !self.kill(&target, force).await {
            return FreeOutcome::KillFailed(target);
        }

        match self.verify_free(target.port).await {
            Some(holder) => {
                info!(port = target.port, pid = holder.pid, "Port still in use after kill");
                FreeOutcome::StillInUse {
                    killed: target,
                    holder,
                }
            }
            None => FreeOutcome::Freed(target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Lookup, ProcessDetails};
    use parking_lot::RwLock;
    use std::collections::BTreeMap;

    /// Mock platform holding a fake socket table.
    struct MockPlatform {
        listeners: RwLock<BTreeMap<u16, ProcessDescriptor>>,
        kill_succeeds: bool,
        /// Port that a respawned process grabs right after a kill.
        respawn: Option<ProcessDescriptor>,
        kills: RwLock<Vec<(u32, bool)>>,
        lookups: RwLock<usize>,
    }

    impl MockPlatform {
        fn new(listeners: Vec<ProcessDescriptor>) -> Self {
            Self {
                listeners: RwLock::new(listeners.into_iter().map(|d| (d.port, d)).collect()),
                kill_succeeds: true,
                respawn: None,
                kills: RwLock::new(Vec::new()),
                lookups: RwLock::new(0),
            }
        }
    }

    impl PlatformPort for MockPlatform {
        async fn find_listener(&self, port: u16) -> Lookup<ProcessDescriptor> {
            *self.lookups.write() += 1;
            match self.listeners.read().get(&port) {
                Some(d) => Lookup::Found(d.clone()),
                None => Lookup::NotFound,
            }
        }

        async fn scan_listeners(&self) -> Lookup<Vec<ProcessDescriptor>> {
            Lookup::Found(self.listeners.read().values().cloned().collect())
        }

        async fn terminate(&self, pid: u32, force: bool) -> bool {
            self.kills.write().push((pid, force));
            if !self.kill_succeeds {
                return false;
            }
            let mut listeners = self.listeners.write();
            listeners.retain(|_, d| d.pid != pid);
            if let Some(respawned) = &self.respawn {
                listeners.insert(respawned.port, respawned.clone());
            }
            true
        }
    }

    fn descriptor(port: u16, pid: u32, name: &str) -> ProcessDescriptor {
        ProcessDescriptor::new(port, pid, ProcessDetails::name_only(name))
    }

    fn service(platform: MockPlatform) -> PortService<MockPlatform> {
        PortService::new(platform, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_kill_and_verify_scenario() {
        let platform = MockPlatform::new(vec![descriptor(3000, 1234, "node")]);
        let service = PortService::with_config(platform, &Config::default());

        let found = service.inspect(3000).await.unwrap();
        assert_eq!((found.port, found.pid, found.name.as_str()), (3000, 1234, "node"));

        assert!(service.kill(&found, false).await);
        assert!(service.verify_free(3000).await.is_none());
    }

    #[tokio::test]
    async fn test_free_port_freed() {
        let service = service(MockPlatform::new(vec![
            descriptor(3000, 1234, "node"),
            descriptor(9229, 1234, "node"),
            descriptor(5432, 99, "postgres"),
        ]));

        let outcome = service.free_port(3000, false).await;
        assert_eq!(outcome, FreeOutcome::Freed(descriptor(3000, 1234, "node")));
        assert_eq!(*service.platform().kills.read(), vec![(1234, false)]);

        let remaining: Vec<u16> = service.scan().await.iter().map(|d| d.port).collect();
        assert_eq!(remaining, vec![5432]);
    }

    #[tokio::test]
    async fn test_free_port_already_free() {
        let service = service(MockPlatform::new(vec![]));
        assert_eq!(service.free_port(3000, true).await, FreeOutcome::AlreadyFree);
        assert!(service.platform().kills.read().is_empty());
    }

    #[tokio::test]
    async fn test_free_port_kill_failed() {
        let mut platform = MockPlatform::new(vec![descriptor(80, 1, "nginx")]);
        platform.kill_succeeds = false;
        let service = service(platform);

        let outcome = service.free_port(80, true).await;
        assert_eq!(outcome, FreeOutcome::KillFailed(descriptor(80, 1, "nginx")));
        assert_eq!(*service.platform().kills.read(), vec![(1, true)]);
    }

    #[tokio::test]
    async fn test_free_port_still_in_use() {
        let mut platform = MockPlatform::new(vec![descriptor(3000, 1234, "node")]);
        platform.respawn = Some(descriptor(3000, 1300, "node"));
        let service = service(platform);

        match service.free_port(3000, false).await {
            FreeOutcome::StillInUse { killed, holder } => {
                assert_eq!(killed.pid, 1234);
                assert_eq!(holder.pid, 1300);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_free_listener_skips_the_initial_lookup() {
        let service = service(MockPlatform::new(vec![descriptor(5173, 42, "vite")]));
        let target = service.inspect(5173).await.unwrap();
        assert_eq!(*service.platform().lookups.read(), 1);

        let outcome = service.free_listener(target, true).await;
        assert_eq!(outcome, FreeOutcome::Freed(descriptor(5173, 42, "vite")));
        // only the post-kill verification
        assert_eq!(*service.platform().lookups.read(), 2);
        assert_eq!(*service.platform().kills.read(), vec![(42, true)]);
    }

    #[tokio::test]
    async fn test_free_listener_when_process_already_exited() {
        let service = service(MockPlatform::new(vec![]));

        // a stale descriptor is still killed and verified, never "already free"
        let outcome = service.free_listener(descriptor(5173, 42, "vite"), false).await;
        assert_eq!(outcome, FreeOutcome::Freed(descriptor(5173, 42, "vite")));
    }

    #[tokio::test]
    async fn test_service_over_borrowed_platform() {
        let platform = MockPlatform::new(vec![descriptor(8080, 7, "caddy")]);
        let service = PortService::new(&platform, Duration::ZERO);

        assert_eq!(service.scan().await.len(), 1);
        assert!(service.inspect(8081).await.is_none());
    }
}
