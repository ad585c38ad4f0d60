//! HTTP transport configuration.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Identification string. Board servers reject clients that do not send one.
fn default_user_agent() -> String {
    "Monazilla/1.00 bbsync/0.1".to_string()
}

const fn default_timeout_secs() -> u64 {
    20
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_base_delay_ms() -> u64 {
    250
}

const fn default_max_delay_ms() -> u64 {
    2_000
}

/// Upper bound on `max_attempts`; retries must stay a small fixed cap.
pub const MAX_ATTEMPTS_CEILING: u32 = 10;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransportConfig {
    /// Value of the `User-Agent` header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per request for transient network failures (including the first).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry, in milliseconds. Doubles per retry.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Backoff ceiling, in milliseconds.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl TransportConfig {
    /// Check the retry bounds and identification header.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::invalid("transport.user_agent", "must not be empty"));
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::invalid("transport.max_attempts", "must be at least 1"));
        }
        if self.max_attempts > MAX_ATTEMPTS_CEILING {
            return Err(ConfigError::invalid(
                "transport.max_attempts",
                format!("must not exceed {MAX_ATTEMPTS_CEILING}"),
            ));
        }
        if self.base_delay_ms > self.max_delay_ms {
            return Err(ConfigError::invalid(
                "transport.base_delay_ms",
                "must not exceed transport.max_delay_ms",
            ));
        }
        Ok(())
    }
}
