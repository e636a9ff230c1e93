//! Inspect command - show what holds each port and optionally kill it.

use anyhow::Result;
use portpilot_core::{Config, FreeOutcome, Platform, PortService, ProcessDescriptor};
use serde_json::json;
use tracing::debug;

use crate::ui;

/// What to do with the listeners that were found.
#[derive(Debug, Clone, Copy)]
pub struct Action {
    pub kill: bool,
    pub free: bool,
    pub force: bool,
    pub json: bool,
}

impl Action {
    /// Kill without asking.
    fn unattended(&self) -> bool {
        self.kill || self.free
    }
}

pub async fn run(platform: &Platform, config: &Config, ports: &[u16], action: Action) -> Result<()> {
    let service = PortService::with_config(platform, config);

    let mut found = Vec::new();
    for &port in ports {
        debug!(port = port, "Inspecting port");
        match service.inspect(port).await {
            Some(descriptor) => found.push(descriptor),
            None if !action.json => ui::info(&format!("Port {} is free", port)),
            None => {}
        }
    }

    if action.json {
        return report_json(&service, ports, &found, action).await;
    }

    if found.is_empty() {
        return Ok(());
    }
    ui::print_table(&found);

    let interactive = atty::is(atty::Stream::Stdin);
    for target in &found {
        if action.free {
            let outcome = service.free_listener(target.clone(), action.force).await;
            debug!(port = target.port, outcome = ?outcome, "Free finished");
            render_outcome(outcome);
            continue;
        }

        let confirmed = action.unattended()
            || (interactive && ui::confirm(&format!("Kill {}?", target))?);
        if !confirmed {
            continue;
        }

        let killed = service.kill(target, action.force).await;
        debug!(port = target.port, pid = target.pid, killed = killed, "Kill finished");
        if killed {
            ui::success(&format!("Killed {}", target));
        } else {
            ui::failure(&format!("Could not kill {}", target));
        }
    }

    Ok(())
}

fn render_outcome(outcome: FreeOutcome) {
    match outcome {
        FreeOutcome::AlreadyFree => {}
        FreeOutcome::Freed(target) => {
            ui::success(&format!("Killed {}; port {} is free", target, target.port))
        }
        FreeOutcome::StillInUse { killed, holder } => ui::warning(&format!(
            "Killed {} but port {} is still in use by {}",
            killed, killed.port, holder
        )),
        FreeOutcome::KillFailed(target) => ui::failure(&format!("Could not kill {}", target)),
    }
}

async fn report_json(
    service: &PortService<&Platform>,
    ports: &[u16],
    found: &[ProcessDescriptor],
    action: Action,
) -> Result<()> {
    let mut report = Vec::with_capacity(ports.len());

    for &port in ports {
        let listener = found.iter().find(|d| d.port == port);
        let result = match listener {
            None => "free",
            Some(target) if action.free => {
                outcome_label(&service.free_listener(target.clone(), action.force).await)
            }
            Some(target) if action.kill => {
                if service.kill(target, action.force).await {
                    "killed"
                } else {
                    "kill_failed"
                }
            }
            Some(_) => "in_use",
        };

        report.push(json!({
            "port": port,
            "process": listener,
            "result": result,
        }));
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Machine-readable name of a free outcome.
fn outcome_label(outcome: &FreeOutcome) -> &'static str {
    match outcome {
        FreeOutcome::AlreadyFree => "free",
        FreeOutcome::Freed(_) => "freed",
        FreeOutcome::StillInUse { .. } => "still_in_use",
        FreeOutcome::KillFailed(_) => "kill_failed",
    }
}
