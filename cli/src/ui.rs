//! Terminal output helpers.

use std::io::{self, BufRead, Write};

use crossterm::style::Stylize;
use portpilot_core::ProcessDescriptor;

const PROCESS_WIDTH: usize = 20;

pub fn print_table(rows: &[ProcessDescriptor]) {
    let header = format!(
        "{:<6} {:<8} {:<20} {:<10} {:<8}",
        "PORT", "PID", "PROCESS", "UPTIME", "MEMORY"
    );
    println!("{}", header.bold());
    println!("{}", "-".repeat(56).dark_grey());

    for row in rows {
        let uptime = if row.uptime.is_empty() {
            "\u{2013}"
        } else {
            row.uptime.as_str()
        };
        println!(
            "{} {:<8} {:<20} {:<10} {:<8}",
            format!("{:<6}", row.port).cyan(),
            row.pid,
            truncate(&row.name, PROCESS_WIDTH),
            uptime,
            row.display_memory()
        );
    }
}

pub fn info(message: &str) {
    println!("{} {}", "•".dark_grey(), message);
}

pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn warning(message: &str) {
    println!("{} {}", "!".yellow(), message);
}

pub fn failure(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Ask a yes/no question on stdin. Anything but "y"/"yes" is a no.
pub fn confirm(question: &str) -> io::Result<bool> {
    print!("{} {} ", question, "[y/N]".dark_grey());
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max - 1).collect();
        format!("{}…", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("no"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("node", 20), "node");
        assert_eq!(truncate("com.docker.backend", 8), "com.doc…");
        assert_eq!(truncate("ñandú-server", 5), "ñand…");
    }
}
