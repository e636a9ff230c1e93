//! `wmic process ... /FORMAT:CSV` parser.
//!
//! Columns come back alphabetically:
//! ```text
//! Node,CommandLine,CreationDate,Name,ProcessId,WorkingSetSize
//! HOST,"C:\node.exe" server.js --a=1,b,20240115103000.123456+060,node.exe,5432,52428800
//! ```
//! `CommandLine` is free text and may contain commas, so rows are matched
//! from both ends with the fixed-format columns anchored at the tail.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::domain::ProcessDetails;

use super::uptime::uptime_since;
use super::{cached_regex, strip_exe};

/// The fields requested from WMI, in the order passed to `get`.
pub const FIELDS: &str = "ProcessId,Name,CommandLine,WorkingSetSize,CreationDate";

/// Build the `where` expression selecting every PID in one query.
pub fn pid_filter(pids: &[u32]) -> String {
    pids.iter()
        .map(|pid| format!("ProcessId={}", pid))
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Parse the rows for the `wanted` PIDs.
///
/// Rows for other PIDs and rows that do not match the layout are ignored.
pub fn parse_wmic_csv(
    output: &str,
    wanted: &HashSet<u32>,
    now: DateTime<Utc>,
) -> HashMap<u32, ProcessDetails> {
    static ROW: OnceLock<Regex> = OnceLock::new();
    let row = cached_regex(
        &ROW,
        r"^[^,]*,(.*),(\d{14}\.\d+[+-]\d{3}),([^,]+),(\d+),(\d+)$",
    );

    let mut details = HashMap::new();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("Node,") {
            continue;
        }

        let Some(caps) = row.captures(line) else {
            continue;
        };

        let pid: u32 = match caps[4].parse() {
            Ok(p) => p,
            Err(_) => continue,
        };
        if !wanted.contains(&pid) {
            continue;
        }

        let name = strip_exe(&caps[3]).to_string();
        let command = caps[1].trim();
        let memory: u64 = caps[5].parse().unwrap_or(0);
        let uptime = uptime_since(&caps[2], now).unwrap_or_default();

        details.insert(
            pid,
            ProcessDetails {
                command: if command.is_empty() {
                    name.clone()
                } else {
                    command.to_string()
                },
                name,
                memory,
                uptime,
            },
        );
    }

    details
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-15T11:45:10Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn wanted(pids: &[u32]) -> HashSet<u32> {
        pids.iter().copied().collect()
    }

    #[test]
    fn test_pid_filter() {
        assert_eq!(pid_filter(&[10]), "ProcessId=10");
        assert_eq!(pid_filter(&[10, 20, 30]), "ProcessId=10 or ProcessId=20 or ProcessId=30");
    }

    #[test]
    fn test_parse_rows_with_commas_in_command_line() {
        let output = "\r\r\nNode,CommandLine,CreationDate,Name,ProcessId,WorkingSetSize\r\r\n\
HOST,\"C:\\Program Files\\nodejs\\node.exe\" server.js --hosts=a,b,c,20240115103000.123456+060,node.exe,10,52428800\r\r\n\
HOST,,20240115114500.000000+000,System,4,8192\r\r\n";

        let details = parse_wmic_csv(output, &wanted(&[10, 4]), now());
        assert_eq!(details.len(), 2);

        let node = &details[&10];
        assert_eq!(node.name, "node");
        assert_eq!(
            node.command,
            "\"C:\\Program Files\\nodejs\\node.exe\" server.js --hosts=a,b,c"
        );
        assert_eq!(node.memory, 52_428_800);
        assert_eq!(node.uptime, "2h 15m");

        let system = &details[&4];
        assert_eq!(system.command, "System");
        assert_eq!(system.uptime, "10s");
    }

    #[test]
    fn test_ignores_unwanted_and_malformed_rows() {
        let output = "Node,CommandLine,CreationDate,Name,ProcessId,WorkingSetSize\n\
HOST,svc.exe,20240115103000.000000+000,svc.exe,99,1024\n\
HOST,broken row without the fixed columns\n\
HOST,idle,,Idle,10,0\n";

        let details = parse_wmic_csv(output, &wanted(&[10]), now());
        assert!(details.is_empty());
    }

    #[test]
    fn test_skips_rows_with_out_of_range_offset() {
        let output = "HOST,node app.js,20240115103000.000000+99999999999999,node.exe,10,1024\n\
HOST,postgres -D data,20240115103000.000000+000,postgres.exe,20,2048\n";

        let details = parse_wmic_csv(output, &wanted(&[10, 20]), now());
        assert_eq!(details.len(), 1);
        assert!(!details.contains_key(&10));
        assert_eq!(details[&20].name, "postgres");
        assert_eq!(details[&20].uptime, "1h 15m");
    }
}
