//! `ps` detail parser.
//!
//! Expected output of `ps -p <pid> -o rss= -o etime= -o args=`:
//! ```text
//!  51200    02:15:30 node /srv/app/server.js --port 3000
//! ```

use crate::domain::ProcessDetails;

use super::uptime::format_clock;

/// Parse the single detail row for a PID.
///
/// RSS is reported in KiB and converted to bytes. `name` is the short name
/// already known from the socket listing; the command falls back to it.
pub fn parse_ps_details(output: &str, name: &str) -> Option<ProcessDetails> {
    let line = output.lines().map(str::trim).find(|l| !l.is_empty())?;
    let mut parts = line.split_whitespace();

    let rss_kib: u64 = parts.next()?.parse().ok()?;
    let etime = parts.next()?;
    let command = parts.collect::<Vec<_>>().join(" ");

    Some(ProcessDetails {
        name: name.to_string(),
        command: if command.is_empty() {
            name.to_string()
        } else {
            command
        },
        memory: rss_kib * 1024,
        uptime: format_etime(etime),
    })
}

/// Normalize a `ps` elapsed-time field.
///
/// Shapes, most specific first: `D-HH:MM:SS` → `Dd Hh`, `HH:MM:SS` → `Hh Mm`,
/// `MM:SS` → `Mm Ss`, bare seconds → `Ns`. Anything else yields "".
pub fn format_etime(etime: &str) -> String {
    parse_etime(etime.trim()).unwrap_or_default()
}

fn parse_etime(etime: &str) -> Option<String> {
    let (days, clock) = match etime.split_once('-') {
        Some((days, clock)) => (Some(number(days)?), clock),
        None => (None, etime),
    };

    let fields = clock.split(':').map(number).collect::<Option<Vec<u64>>>()?;

    match (days, fields.as_slice()) {
        (Some(d), [h, _, _]) => Some(format!("{}d {}h", d, h)),
        (None, [h, m, _]) => Some(format!("{}h {}m", h, m)),
        (None, [m, s]) => Some(format!("{}m {}s", m, s)),
        (None, [s]) => Some(format_clock(0, 0, 0, *s)),
        _ => None,
    }
}

fn number(field: &str) -> Option<u64> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}
