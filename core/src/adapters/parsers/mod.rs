//! Text parsers for the output of the OS introspection tools.
//!
//! Every parser is a pure function over captured stdout so it can be tested
//! with synthetic tables. Rows that do not match the expected layout are
//! skipped; a bad row never fails the whole table.

pub mod lsof;
pub mod netstat;
pub mod ps;
pub mod tasklist;
pub mod uptime;
pub mod wmic;

use std::sync::OnceLock;

use regex::Regex;

/// Strip a trailing `.exe` (any case) from a Windows image name.
pub fn strip_exe(image: &str) -> &str {
    let len = image.len();
    if len > 4 && image.is_char_boundary(len - 4) && image[len - 4..].eq_ignore_ascii_case(".exe") {
        &image[..len - 4]
    } else {
        image
    }
}

/// Compile a pattern once and keep it for the life of the process.
pub(crate) fn cached_regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("parser patterns are valid regexes"))
}
