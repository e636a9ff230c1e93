//! Windows platform variant using `netstat`, `wmic`, `tasklist` and `taskkill`.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::Utc;
use tracing::{debug, warn};

use crate::domain::{Lookup, ProcessDescriptor, ProcessDetails};
use crate::error::{Error, Result};
use crate::ports::{CommandRunner, PlatformPort};

use super::command::SystemRunner;
use super::parsers::{netstat, tasklist, wmic};

const NETSTAT: &str = "netstat";
const WMIC: &str = "wmic";
const TASKLIST: &str = "tasklist";
const TASKKILL: &str = "taskkill";

/// Windows platform.
///
/// Resolves listeners from the `netstat` connection table and enriches all
/// PIDs of a query with a single `wmic` call, falling back to `tasklist`.
#[derive(Debug, Default)]
pub struct WindowsPlatform<R = SystemRunner> {
    runner: R,
}

impl<R: CommandRunner> WindowsPlatform<R> {
    /// Create a Windows platform on top of a command runner.
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Fetch the TCP connection table with owning PIDs.
    ///
    /// Executes: `netstat -ano -p TCP`
    async fn connection_table(&self) -> Result<String> {
        let output = self.runner.run(NETSTAT, &["-ano", "-p", "TCP"]).await?;

        if !output.success {
            return Err(Error::CommandFailed(format!(
                "netstat -ano -p TCP failed: {}",
                output.stderr.trim()
            )));
        }

        Ok(output.stdout)
    }

    /// Enrich a set of PIDs with one tool invocation.
    ///
    /// Every requested PID gets an entry: PIDs the tools do not describe keep
    /// the placeholder. `wmic` is tried first; if it fails outright the
    /// `tasklist` listing supplies names and memory only.
    pub async fn batch_details(&self, pids: &[u32]) -> HashMap<u32, ProcessDetails> {
        let mut details: HashMap<u32, ProcessDetails> = pids
            .iter()
            .map(|pid| (*pid, ProcessDetails::placeholder()))
            .collect();
        if details.is_empty() {
            return details;
        }

        let wanted: HashSet<u32> = pids.iter().copied().collect();

        match self.query_wmic(pids, &wanted).await {
            Ok(found) => {
                debug!(requested = wanted.len(), described = found.len(), "wmic enrichment");
                details.extend(found);
                return details;
            }
            Err(e) => warn!(error = %e, "wmic enrichment failed, falling back to tasklist"),
        }

        match self.query_tasklist(&wanted).await {
            Ok(found) => {
                debug!(requested = wanted.len(), described = found.len(), "tasklist enrichment");
                details.extend(found);
            }
            Err(e) => warn!(error = %e, "tasklist fallback failed, using placeholders"),
        }

        details
    }

    /// Executes: `wmic process where "ProcessId=A or ..." get <fields> /FORMAT:CSV`
    async fn query_wmic(
        &self,
        pids: &[u32],
        wanted: &HashSet<u32>,
    ) -> Result<HashMap<u32, ProcessDetails>> {
        let filter = wmic::pid_filter(pids);
        let output = self
            .runner
            .run(WMIC, &["process", "where", &filter, "get", wmic::FIELDS, "/FORMAT:CSV"])
            .await?;

        if !output.success {
            return Err(Error::CommandFailed(format!(
                "wmic failed: {}",
                output.stderr.trim()
            )));
        }

        let found = wmic::parse_wmic_csv(&output.stdout, wanted, Utc::now());
        if found.is_empty() {
            return Err(Error::ParseError("no readable wmic rows".to_string()));
        }
        Ok(found)
    }

    /// Executes: `tasklist /FO CSV /NH`
    async fn query_tasklist(&self, wanted: &HashSet<u32>) -> Result<HashMap<u32, ProcessDetails>> {
        let output = self.runner.run(TASKLIST, &["/FO", "CSV", "/NH"]).await?;

        if !output.success {
            return Err(Error::CommandFailed(format!(
                "tasklist failed: {}",
                output.stderr.trim()
            )));
        }

        Ok(tasklist::parse_tasklist_csv(&output.stdout, wanted))
    }

    /// Run `taskkill`, optionally with `/F`. Returns whether it succeeded.
    async fn taskkill(&self, pid: u32, force: bool) -> bool {
        let pid_arg = pid.to_string();
        let result = if force {
            self.runner.run(TASKKILL, &["/F", "/PID", &pid_arg]).await
        } else {
            self.runner.run(TASKKILL, &["/PID", &pid_arg]).await
        };

        match result {
            Ok(output) if output.success => {
                debug!(pid = pid, force = force, "taskkill succeeded");
                true
            }
            Ok(output) => {
                let combined = format!("{} {}", output.stdout.trim(), output.stderr.trim());
                debug!(pid = pid, force = force, output = %combined.trim(), "taskkill failed");
                false
            }
            Err(e) => {
                warn!(pid = pid, force = force, error = %e, "Failed to run taskkill");
                false
            }
        }
    }
}

impl<R: CommandRunner> PlatformPort for WindowsPlatform<R> {
    async fn find_listener(&self, port: u16) -> Lookup<ProcessDescriptor> {
        if port == 0 {
            return Lookup::NotFound;
        }

        let table = match self.connection_table().await {
            Ok(table) => table,
            Err(e) => {
                debug!(port = port, error = %e, "Connection table unavailable");
                return e.into();
            }
        };

        let Some(pid) = netstat::parse_netstat_listeners(&table)
            .into_iter()
            .find(|(p, _)| *p == port)
            .map(|(_, pid)| pid)
        else {
            return Lookup::NotFound;
        };

        debug!(port = port, pid = pid, "Found listener");
        let details = self
            .batch_details(&[pid])
            .await
            .remove(&pid)
            .unwrap_or_else(ProcessDetails::placeholder);
        Lookup::Found(ProcessDescriptor::new(port, pid, details))
    }

    async fn scan_listeners(&self) -> Lookup<Vec<ProcessDescriptor>> {
        let table = match self.connection_table().await {
            Ok(table) => table,
            Err(e) => {
                warn!(error = %e, "Connection table unavailable");
                return e.into();
            }
        };

        // First pass: first PID seen for each port wins
        let mut port_pids: BTreeMap<u16, u32> = BTreeMap::new();
        for (port, pid) in netstat::parse_netstat_listeners(&table) {
            port_pids.entry(port).or_insert(pid);
        }

        // Second pass: one detail query for the distinct PIDs
        let pids: Vec<u32> = port_pids
            .values()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let details = self.batch_details(&pids).await;

        let descriptors = port_pids
            .into_iter()
            .map(|(port, pid)| {
                let entry = details
                    .get(&pid)
                    .cloned()
                    .unwrap_or_else(ProcessDetails::placeholder);
                ProcessDescriptor::new(port, pid, entry)
            })
            .collect::<Vec<_>>();

        debug!(ports = descriptors.len(), pids = pids.len(), "Scan complete");
        Lookup::Found(descriptors)
    }

    async fn terminate(&self, pid: u32, force: bool) -> bool {
        if pid == 0 {
            warn!(pid = pid, "Refusing to kill an invalid PID");
            return false;
        }

        if self.taskkill(pid, force).await {
            return true;
        }
        if force {
            return false;
        }

        debug!(pid = pid, "Graceful taskkill failed, retrying with /F");
        self.taskkill(pid, true).await
    }
}
