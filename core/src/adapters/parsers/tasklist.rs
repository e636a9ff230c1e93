//! `tasklist /FO CSV /NH` parser, the low-fidelity fallback.
//!
//! ```text
//! "node.exe","5432","Console","1","45,000 K"
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;

use crate::domain::ProcessDetails;

use super::{cached_regex, strip_exe};

/// Parse name and memory for the `wanted` PIDs.
///
/// Memory is reported in KiB with locale thousands separators. There is no
/// command line or start time, so the command is the name and uptime is "".
pub fn parse_tasklist_csv(output: &str, wanted: &HashSet<u32>) -> HashMap<u32, ProcessDetails> {
    static ROW: OnceLock<Regex> = OnceLock::new();
    let row = cached_regex(
        &ROW,
        r#""([^"]+)","(\d+)","[^"]*","[^"]*","([\d,.\s\u{a0}]+?)\s*K""#,
    );

    let mut details = HashMap::new();

    for line in output.lines() {
        let Some(caps) = row.captures(line) else {
            continue;
        };

        let pid: u32 = match caps[2].parse() {
            Ok(p) => p,
            Err(_) => continue,
        };
        if !wanted.contains(&pid) {
            continue;
        }

        let digits: String = caps[3].chars().filter(char::is_ascii_digit).collect();
        let memory = digits.parse::<u64>().map(|kib| kib * 1024).unwrap_or(0);

        let mut entry = ProcessDetails::name_only(strip_exe(&caps[1]));
        entry.memory = memory;
        details.insert(pid, entry);
    }

    details
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tasklist_csv() {
        let output = r#"
"System Idle Process","0","Services","0","8 K"
"System","4","Services","0","144 K"
"node.exe","5432","Console","1","45,000 K"
"postgres.exe","1234","Services","0","32.768 K"
"#;
        let wanted: HashSet<u32> = [4, 5432, 1234].into_iter().collect();
        let details = parse_tasklist_csv(output, &wanted);

        assert_eq!(details.len(), 3);
        assert_eq!(details[&5432].name, "node");
        assert_eq!(details[&5432].command, "node");
        assert_eq!(details[&5432].memory, 45_000 * 1024);
        assert!(details[&5432].uptime.is_empty());
        assert_eq!(details[&1234].memory, 32_768 * 1024);
        assert_eq!(details[&4].name, "System");
    }

    #[test]
    fn test_skips_unwanted_and_malformed_rows() {
        let output = "\"node.exe\",\"5432\",\"Console\",\"1\",\"45,000 K\"\nINFO: No tasks are running\n";
        let wanted: HashSet<u32> = [1].into_iter().collect();
        assert!(parse_tasklist_csv(output, &wanted).is_empty());
    }
}
