//! Explicit outcome of a resolver query.

use crate::error::Error;

/// What a resolver actually observed.
///
/// Callers that only care about the observed contract use [`Lookup::found`]
/// (absence and failure both become `None`); callers that want to tell a free
/// port from a missing tool can match on the variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The tool reported a matching listener.
    Found(T),
    /// The tool ran and reported nothing for the query.
    NotFound,
    /// The tool could not be run, exited with an error, or timed out.
    ToolUnavailable(String),
    /// The tool ran but its output could not be understood.
    ParseFailure(String),
}

impl<T> Lookup<T> {
    /// Collapse to the observed contract: only `Found` carries a value.
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            _ => None,
        }
    }

    /// Whether the query produced a value.
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    /// Whether the query failed for a reason other than plain absence.
    pub fn is_failure(&self) -> bool {
        matches!(self, Lookup::ToolUnavailable(_) | Lookup::ParseFailure(_))
    }
}

impl<T> Lookup<Vec<T>> {
    /// Collapse a scan to the observed contract: empty on any failure.
    pub fn found_or_empty(self) -> Vec<T> {
        self.found().unwrap_or_default()
    }
}

impl<T> From<Error> for Lookup<T> {
    fn from(error: Error) -> Self {
        match error {
            Error::ParseError(reason) => Lookup::ParseFailure(reason),
            other => Lookup::ToolUnavailable(other.to_string()),
        }
    }
}
