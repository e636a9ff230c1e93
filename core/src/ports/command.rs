//! Command runner port (interface).

use crate::error::Result;

/// Captured result of one external tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Whether the tool exited with a zero status.
    pub success: bool,
    /// Standard output, lossily decoded.
    pub stdout: String,
    /// Standard error, lossily decoded.
    pub stderr: String,
}

impl CommandOutput {
    /// A successful invocation with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed invocation with the given stderr.
    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Port for spawning external tools.
///
/// Every `lsof`, `ps`, `netstat`, `wmic`, `tasklist` and `taskkill` call goes
/// through this trait, one invocation at a time.
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` to completion.
    ///
    /// Returns `Err` when the tool could not be spawned or exceeded its time
    /// budget. A non-zero exit is reported through [`CommandOutput::success`].
    fn run(
        &self,
        program: &str,
        args: &[&str],
    ) -> impl std::future::Future<Output = Result<CommandOutput>> + Send;
}
