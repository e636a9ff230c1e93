//! System command runner backed by `tokio::process`.

use std::io::ErrorKind;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::ports::{CommandOutput, CommandRunner};

/// Runs tools on the host, one at a time, under an optional time budget.
///
/// A child that outlives the budget is killed when its future is dropped.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    timeout: Option<Duration>,
}

impl SystemRunner {
    /// Create a runner with an explicit budget (`None` waits forever).
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// Create a runner using the configured budget.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.command_timeout())
    }

    /// The budget applied to each invocation.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl CommandRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        debug!(program = program, args = ?args, "Running command");

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let started = Instant::now();
        let result = match self.timeout {
            Some(budget) => match tokio::time::timeout(budget, cmd.output()).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(program = program, budget = ?budget, "Command timed out");
                    return Err(Error::Timeout {
                        program: program.to_string(),
                        elapsed: started.elapsed(),
                    });
                }
            },
            None => cmd.output().await,
        };

        let output = result.map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::CommandFailed(format!("{}: command not found", program)),
            _ => Error::Io(e),
        })?;

        let output = CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        debug!(
            program = program,
            success = output.success,
            stdout_bytes = output.stdout.len(),
            "Command finished"
        );
        Ok(output)
    }
}

/// Scripted runner for exercising platform variants without the real tools.
#[cfg(test)]
pub(crate) mod testing {
    use parking_lot::Mutex;

    use super::*;

    /// What a scripted invocation answers.
    #[derive(Debug, Clone)]
    pub(crate) enum Reply {
        Output(CommandOutput),
        Missing,
        TimedOut,
    }

    impl Reply {
        pub(crate) fn stdout(stdout: &str) -> Self {
            Reply::Output(CommandOutput::ok(stdout))
        }

        pub(crate) fn exit_failure(stderr: &str) -> Self {
            Reply::Output(CommandOutput::failed(stderr))
        }
    }

    struct Step {
        program: String,
        needle: Option<String>,
        reply: Reply,
    }

    /// Answers invocations from a script and records every command line.
    ///
    /// The first step whose program matches (and whose needle, if any, occurs
    /// in the joined command line) answers. Unscripted programs are "missing".
    #[derive(Default)]
    pub(crate) struct ScriptedRunner {
        steps: Vec<Step>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedRunner {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn on(mut self, program: &str, reply: Reply) -> Self {
            self.steps.push(Step {
                program: program.to_string(),
                needle: None,
                reply,
            });
            self
        }

        pub(crate) fn on_args(mut self, program: &str, needle: &str, reply: Reply) -> Self {
            self.steps.push(Step {
                program: program.to_string(),
                needle: Some(needle.to_string()),
                reply,
            });
            self
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }

        pub(crate) fn count(&self, program: &str) -> usize {
            let prefix = format!("{} ", program);
            self.calls
                .lock()
                .iter()
                .filter(|line| line.starts_with(&prefix) || line.as_str() == program)
                .count()
        }
    }

    impl CommandRunner for ScriptedRunner {
        async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
            let line = std::iter::once(program)
                .chain(args.iter().copied())
                .collect::<Vec<_>>()
                .join(" ");
            self.calls.lock().push(line.clone());

            let step = self.steps.iter().find(|step| {
                step.program == program
                    && step.needle.as_deref().map_or(true, |n| line.contains(n))
            });

            match step.map(|s| s.reply.clone()) {
                Some(Reply::Output(output)) => Ok(output),
                Some(Reply::TimedOut) => Err(Error::Timeout {
                    program: program.to_string(),
                    elapsed: Duration::from_secs(30),
                }),
                Some(Reply::Missing) | None => Err(Error::CommandFailed(format!(
                    "{}: command not found",
                    program
                ))),
            }
        }
    }
}
