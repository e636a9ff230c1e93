//! `netstat` connection-table parser.
//!
//! Expected output of `netstat -ano -p TCP`:
//! ```text
//! Active Connections
//!
//!   Proto  Local Address          Foreign Address        State           PID
//!   TCP    0.0.0.0:135            0.0.0.0:0              LISTENING       1020
//!   TCP    127.0.0.1:3000         127.0.0.1:51234        ESTABLISHED     5432
//! ```

/// Extract `(port, pid)` from a row in the `LISTENING` state.
///
/// The port is the trailing `:port` of the local address, the PID the last
/// column. Other states, headers, and rows with PID 0 yield `None`.
pub fn parse_netstat_line(line: &str) -> Option<(u16, u32)> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 4 || !parts[0].starts_with("TCP") {
        return None;
    }
    if !parts.iter().any(|p| *p == "LISTENING") {
        return None;
    }

    let pid: u32 = parts.last()?.parse().ok()?;
    if pid == 0 {
        return None;
    }

    let port = local_port(parts[1])?;
    Some((port, pid))
}

/// All listening `(port, pid)` pairs in raw output order.
pub fn parse_netstat_listeners(output: &str) -> Vec<(u16, u32)> {
    output.lines().filter_map(parse_netstat_line).collect()
}

fn local_port(address: &str) -> Option<u16> {
    let (_, port) = address.rsplit_once(':')?;
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    port.parse().ok().filter(|port| *port != 0)
}
