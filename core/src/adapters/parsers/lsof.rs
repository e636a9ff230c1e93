//! `lsof` listing parser.
//!
//! Expected output of `lsof -iTCP -sTCP:LISTEN -P -n +c 0`:
//! ```text
//! COMMAND    PID  USER   FD   TYPE             DEVICE SIZE/OFF NODE NAME
//! node     34805  code   19u  IPv6 0x3d8015e195af1f3f      0t0  TCP [::1]:3000 (LISTEN)
//! ```

use std::sync::OnceLock;

use regex::Regex;

use super::cached_regex;

/// Extract `(name, pid)` from one row.
///
/// The header, rows with a non-numeric PID and rows with PID 0 yield `None`.
pub fn parse_lsof_line(line: &str) -> Option<(String, u32)> {
    let mut parts = line.split_whitespace();
    let name = parts.next()?;
    if name == "COMMAND" {
        return None;
    }

    let pid: u32 = parts.next()?.parse().ok()?;
    if pid == 0 {
        return None;
    }

    Some((decode_escaped(name), pid))
}

/// Recover the port from the `:PORT (LISTEN)` suffix of a row.
pub fn listen_port(line: &str) -> Option<u16> {
    static LISTEN: OnceLock<Regex> = OnceLock::new();
    let caps = cached_regex(&LISTEN, r":(\d+)\s+\(LISTEN\)").captures(line)?;
    caps[1].parse().ok().filter(|port| *port != 0)
}

/// Whether the output contains rows besides the header.
pub fn has_rows(output: &str) -> bool {
    output
        .lines()
        .map(str::trim)
        .any(|line| !line.is_empty() && !line.starts_with("COMMAND"))
}

/// Decode the `\xNN` escapes lsof uses for unprintable name bytes.
///
/// `Code\x20Helper` becomes `Code Helper`; malformed escapes are kept as-is.
pub fn decode_escaped(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(idx) = rest.find("\\x") {
        result.push_str(&rest[..idx]);
        let after = &rest[idx + 2..];
        let hex = after.get(..2).filter(|h| h.bytes().all(|b| b.is_ascii_hexdigit()));

        match hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
            Some(byte) => {
                result.push(byte as char);
                rest = &after[2..];
            }
            None => {
                result.push_str("\\x");
                rest = after;
            }
        }
    }

    result.push_str(rest);
    result
}
