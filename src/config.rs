//! Save bridge configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::str::FromStr;
use std::time::Duration;

use crate::consts::{DEFAULT_SAVE_DEBOUNCE_MS, DEFAULT_SAVE_RETRIES, DEFAULT_SAVE_RETRY_BASE_MS};

pub const ENV_SAVE_DEBOUNCE_MS: &str = "MAPKEEP_SAVE_DEBOUNCE_MS";
pub const ENV_SAVE_RETRIES: &str = "MAPKEEP_SAVE_RETRIES";
pub const ENV_SAVE_RETRY_BASE_MS: &str = "MAPKEEP_SAVE_RETRY_BASE_MS";

/// Tuning knobs for the save bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Quiet period after the last mutation before a save fires, in milliseconds.
    pub debounce_ms: u64,
    /// Total write attempts per save, including the first. Never below 1.
    pub retries: usize,
    /// Base delay for linear retry back-off (`attempt * base`), in milliseconds.
    pub retry_base_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_SAVE_DEBOUNCE_MS,
            retries: DEFAULT_SAVE_RETRIES,
            retry_base_ms: DEFAULT_SAVE_RETRY_BASE_MS,
        }
    }
}

impl BridgeConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `MAPKEEP_SAVE_DEBOUNCE_MS`: default 1000
    /// - `MAPKEEP_SAVE_RETRIES`: default 3
    /// - `MAPKEEP_SAVE_RETRY_BASE_MS`: default 200
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            debounce_ms: env_parse(ENV_SAVE_DEBOUNCE_MS, DEFAULT_SAVE_DEBOUNCE_MS),
            retries: env_parse(ENV_SAVE_RETRIES, DEFAULT_SAVE_RETRIES).max(1),
            retry_base_ms: env_parse(ENV_SAVE_RETRY_BASE_MS, DEFAULT_SAVE_RETRY_BASE_MS),
        }
    }

    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Delay before retrying after failed attempt number `attempt` (1-based).
    #[must_use]
    pub fn retry_delay(&self, attempt: usize) -> Duration {
        let attempt = u64::try_from(attempt).unwrap_or(u64::MAX);
        Duration::from_millis(attempt.saturating_mul(self.retry_base_ms))
    }
}

/// Read `key` from the environment and parse it, falling back to `default`
/// when the variable is missing or malformed.
pub fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => parse_or(&raw, default),
        Err(_) => default,
    }
}

fn parse_or<T: FromStr>(raw: &str, default: T) -> T {
    raw.trim().parse::<T>().unwrap_or(default)
}
