//! Scan command - show every listening port.

use anyhow::Result;
use portpilot_core::{Config, Platform, PortService};

use crate::ui;

pub async fn run(platform: &Platform, config: &Config, json: bool) -> Result<()> {
    let service = PortService::with_config(platform, config);
    let listeners = service.scan().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&listeners)?);
        return Ok(());
    }

    if listeners.is_empty() {
        println!("No listening ports found.");
        return Ok(());
    }

    ui::print_table(&listeners);
    println!("\nTotal: {} ports", listeners.len());
    Ok(())
}
