//! PortPilot CLI - See what's using your ports. Kill it.
//!
//! A command-line tool for finding the process behind a listening TCP port,
//! stopping it, and checking that the port was released.

mod commands;
mod ui;

use clap::Parser;
use portpilot_core::{platform, Config};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "portpilot")]
#[command(author, version, about = "See what's using your ports. Kill it.")]
struct Cli {
    /// Ports to inspect
    #[arg(
        value_parser = clap::value_parser!(u16).range(1..),
        required_unless_present_any = ["scan", "show_config"]
    )]
    ports: Vec<u16>,

    /// Kill the listener without asking
    #[arg(short, long)]
    kill: bool,

    /// Kill the listener and check that the port was released
    #[arg(short, long)]
    free: bool,

    /// Start with the forceful signal (SIGKILL / taskkill /F)
    #[arg(long)]
    force: bool,

    /// List every listening port
    #[arg(short, long, conflicts_with = "ports")]
    scan: bool,

    /// Output in JSON format
    #[arg(long)]
    json: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    show_config: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so that --json output stays parseable
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = Config::from_env()?;

    if cli.show_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let platform = platform::global(&config)?;

    if cli.scan {
        commands::scan::run(platform, &config, cli.json).await?;
    } else {
        let action = commands::inspect::Action {
            kill: cli.kill,
            free: cli.free,
            force: cli.force,
            json: cli.json,
        };
        commands::inspect::run(platform, &config, &cli.ports, action).await?;
    }

    Ok(())
}
