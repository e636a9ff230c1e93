//! Runtime configuration.
//!
//! Nothing is persisted: the effective configuration is built from defaults
//! and optionally overridden through environment variables.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable overriding [`Config::command_timeout_ms`].
pub const COMMAND_TIMEOUT_ENV: &str = "PORTPILOT_COMMAND_TIMEOUT_MS";

/// Environment variable overriding [`Config::free_check_delay_ms`].
pub const FREE_CHECK_DELAY_ENV: &str = "PORTPILOT_FREE_CHECK_DELAY_MS";

/// Effective settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Upper bound for every external tool invocation, in milliseconds.
    /// `0` disables the budget.
    #[serde(default = "default_command_timeout_ms", rename = "commandTimeoutMs")]
    pub command_timeout_ms: u64,

    /// Delay between a successful kill and the follow-up port check.
    #[serde(default = "default_free_check_delay_ms", rename = "freeCheckDelayMs")]
    pub free_check_delay_ms: u64,
}

fn default_command_timeout_ms() -> u64 {
    30_000
}

fn default_free_check_delay_ms() -> u64 {
    500
}

impl Default for Config {
    fn default() -> Self {
        Self {
            command_timeout_ms: default_command_timeout_ms(),
            free_check_delay_ms: default_free_check_delay_ms(),
        }
    }
}

impl Config {
    /// Build the configuration from defaults and the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(COMMAND_TIMEOUT_ENV) {
            config.command_timeout_ms = parse_millis(COMMAND_TIMEOUT_ENV, &raw)?;
        }
        if let Some(raw) = lookup(FREE_CHECK_DELAY_ENV) {
            config.free_check_delay_ms = parse_millis(FREE_CHECK_DELAY_ENV, &raw)?;
        }

        Ok(config)
    }

    /// The per-invocation time budget, or `None` when disabled.
    pub fn command_timeout(&self) -> Option<Duration> {
        match self.command_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    /// Delay before re-checking a port after a kill.
    pub fn free_check_delay(&self) -> Duration {
        Duration::from_millis(self.free_check_delay_ms)
    }
}

fn parse_millis(key: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|e| Error::Config(format!("{} must be a number of milliseconds: {}", key, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.command_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.free_check_delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            (COMMAND_TIMEOUT_ENV, "0"),
            (FREE_CHECK_DELAY_ENV, " 1200 "),
        ]))
        .unwrap();

        assert_eq!(config.command_timeout(), None);
        assert_eq!(config.free_check_delay(), Duration::from_millis(1200));
    }

    #[test]
    fn test_malformed_override() {
        let result = Config::from_lookup(lookup_from(&[(COMMAND_TIMEOUT_ENV, "soon")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_serde_field_names() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert_eq!(json["commandTimeoutMs"], 30_000);
        assert_eq!(json["freeCheckDelayMs"], 500);

        let partial: Config = serde_json::from_str(r#"{"freeCheckDelayMs": 10}"#).unwrap();
        assert_eq!(partial.command_timeout_ms, 30_000);
        assert_eq!(partial.free_check_delay_ms, 10);
    }
}
