//! POSIX platform variant using `lsof`, `ps` and signals.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};

use crate::domain::{Lookup, ProcessDescriptor, ProcessDetails};
use crate::error::{Error, Result};
use crate::ports::{CommandRunner, PlatformPort};

use super::command::SystemRunner;
use super::parsers::{lsof, ps};

const LSOF: &str = "lsof";
const PS: &str = "ps";

/// Signals used for termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermSignal {
    /// SIGTERM, a graceful shutdown request.
    Terminate,
    /// SIGKILL, immediate termination.
    Kill,
}

/// POSIX platform (macOS, Linux).
///
/// Resolves listeners with `lsof`, enriches each PID with one `ps` call and
/// terminates with SIGTERM/SIGKILL.
#[derive(Debug, Default)]
pub struct UnixPlatform<R = SystemRunner> {
    runner: R,
}

impl<R: CommandRunner> UnixPlatform<R> {
    /// Create a POSIX platform on top of a command runner.
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// List TCP sockets in the LISTEN state matching `selector`.
    ///
    /// Executes: `lsof <selector> -sTCP:LISTEN -P -n +c 0`
    ///
    /// Flags explained:
    /// - -iTCP[:port]: Show only TCP sockets (optionally on one port)
    /// - -sTCP:LISTEN: Show only listening sockets
    /// - -P: Show port numbers (don't resolve to service names)
    /// - -n: Show IP addresses (don't resolve to hostnames)
    /// - +c 0: Show full command name (unlimited length)
    ///
    /// lsof exits with 1 when nothing matched, so a silent failure is
    /// reported as an empty listing.
    async fn list_sockets(&self, selector: &str) -> Result<String> {
        let output = self
            .runner
            .run(LSOF, &[selector, "-sTCP:LISTEN", "-P", "-n", "+c", "0"])
            .await?;

        if output.success || !output.stdout.trim().is_empty() {
            return Ok(output.stdout);
        }

        let stderr = output.stderr.trim();
        if stderr.is_empty() {
            Ok(String::new())
        } else {
            Err(Error::CommandFailed(format!("lsof {} failed: {}", selector, stderr)))
        }
    }

    /// Fetch RSS, elapsed time and full command line for one PID.
    ///
    /// Executes: `ps -p <pid> -o rss= -o etime= -o args=`
    ///
    /// A failed lookup still yields details carrying the known name.
    async fn process_details(&self, pid: u32, name: &str) -> ProcessDetails {
        let pid_arg = pid.to_string();
        let result = self
            .runner
            .run(PS, &["-p", &pid_arg, "-o", "rss=", "-o", "etime=", "-o", "args="])
            .await;

        match result {
            Ok(output) if output.success => {
                ps::parse_ps_details(&output.stdout, name).unwrap_or_else(|| {
                    debug!(pid = pid, "Unreadable ps output, keeping name only");
                    ProcessDetails::name_only(name)
                })
            }
            Ok(_) => {
                debug!(pid = pid, "ps found no such process, keeping name only");
                ProcessDetails::name_only(name)
            }
            Err(e) => {
                warn!(pid = pid, error = %e, "Failed to run ps");
                ProcessDetails::name_only(name)
            }
        }
    }
}

impl<R: CommandRunner> PlatformPort for UnixPlatform<R> {
    async fn find_listener(&self, port: u16) -> Lookup<ProcessDescriptor> {
        if port == 0 {
            return Lookup::NotFound;
        }

        let listing = match self.list_sockets(&format!("-iTCP:{}", port)).await {
            Ok(listing) => listing,
            Err(e) => {
                debug!(port = port, error = %e, "Socket listing failed");
                return e.into();
            }
        };

        let Some((name, pid)) = listing.lines().find_map(lsof::parse_lsof_line) else {
            if lsof::has_rows(&listing) {
                return Lookup::ParseFailure(format!("no readable lsof row for port {}", port));
            }
            return Lookup::NotFound;
        };

        debug!(port = port, pid = pid, name = %name, "Found listener");
        let details = self.process_details(pid, &name).await;
        Lookup::Found(ProcessDescriptor::new(port, pid, details))
    }

    async fn scan_listeners(&self) -> Lookup<Vec<ProcessDescriptor>> {
        let listing = match self.list_sockets("-iTCP").await {
            Ok(listing) => listing,
            Err(e) => {
                warn!(error = %e, "Socket listing failed");
                return e.into();
            }
        };

        let mut by_port: BTreeMap<u16, ProcessDescriptor> = BTreeMap::new();
        let mut by_pid: HashMap<u32, ProcessDetails> = HashMap::new();

        for line in listing.lines() {
            let Some((name, pid)) = lsof::parse_lsof_line(line) else {
                continue;
            };
            let Some(port) = lsof::listen_port(line) else {
                continue;
            };
            if by_port.contains_key(&port) {
                continue;
            }

            let details = match by_pid.get(&pid) {
                Some(details) => details.clone(),
                None => {
                    let details = self.process_details(pid, &name).await;
                    by_pid.insert(pid, details.clone());
                    details
                }
            };

            by_port.insert(port, ProcessDescriptor::new(port, pid, details));
        }

        debug!(ports = by_port.len(), pids = by_pid.len(), "Scan complete");
        Lookup::Found(by_port.into_values().collect())
    }

    async fn terminate(&self, pid: u32, force: bool) -> bool {
        if pid == 0 || i32::try_from(pid).is_err() {
            warn!(pid = pid, "Refusing to signal an invalid PID");
            return false;
        }
        escalate(pid, force, |signal| send_signal(pid, signal))
    }
}

/// Deliver SIGTERM (or SIGKILL when forced), falling back to one SIGKILL if
/// a graceful send fails.
pub(crate) fn escalate<F>(pid: u32, force: bool, mut send: F) -> bool
where
    F: FnMut(TermSignal) -> Result<()>,
{
    let first = if force {
        TermSignal::Kill
    } else {
        TermSignal::Terminate
    };

    match send(first) {
        Ok(()) => {
            debug!(pid = pid, signal = ?first, "Signal sent");
            true
        }
        Err(e) if force => {
            warn!(pid = pid, error = %e, "Failed to send SIGKILL");
            false
        }
        Err(e) => {
            debug!(pid = pid, error = %e, "SIGTERM failed, escalating to SIGKILL");
            match send(TermSignal::Kill) {
                Ok(()) => true,
                Err(e) => {
                    warn!(pid = pid, error = %e, "Failed to send SIGKILL");
                    false
                }
            }
        }
    }
}

#[cfg(unix)]
fn send_signal(pid: u32, signal: TermSignal) -> Result<()> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let raw = i32::try_from(pid).map_err(|_| Error::CommandFailed(format!("invalid pid {}", pid)))?;
    let signal = match signal {
        TermSignal::Terminate => Signal::SIGTERM,
        TermSignal::Kill => Signal::SIGKILL,
    };

    kill(Pid::from_raw(raw), signal)
        .map_err(|e| Error::CommandFailed(format!("kill({}, {:?}) failed: {}", pid, signal, e)))
}

#[cfg(not(unix))]
fn send_signal(_pid: u32, _signal: TermSignal) -> Result<()> {
    Err(Error::UnsupportedPlatform(
        "POSIX signals are not available on this OS".to_string(),
    ))
}
