//! Example: Scan and display all listening ports.
//!
//! Unlike the CLI this reports tool failures instead of showing an empty
//! table.

use portpilot_core::{platform, Config, Lookup, PlatformPort};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    println!("Scanning ports...\n");

    let platform = match platform::global(&Config::default()) {
        Ok(platform) => platform,
        Err(e) => {
            eprintln!("Error: {}", e);
            return;
        }
    };

    match platform.scan_listeners().await {
        Lookup::Found(ports) if !ports.is_empty() => {
            println!(
                "{:<6} {:<8} {:<20} {:<10} {:<8} {}",
                "PORT", "PID", "PROCESS", "UPTIME", "MEMORY", "COMMAND"
            );
            println!("{}", "-".repeat(100));

            for port in &ports {
                let command: String = port.command.chars().take(40).collect();
                println!(
                    "{:<6} {:<8} {:<20} {:<10} {:<8} {}",
                    port.port,
                    port.pid,
                    port.name,
                    port.uptime,
                    port.display_memory(),
                    command
                );
            }

            println!("\nTotal: {} ports", ports.len());
        }
        Lookup::Found(_) | Lookup::NotFound => println!("No listening ports found."),
        Lookup::ToolUnavailable(reason) => eprintln!("Scan tool unavailable: {}", reason),
        Lookup::ParseFailure(reason) => eprintln!("Could not parse scan output: {}", reason),
    }
}
