//! Submission settings.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Default minimum interval between accepted posts to one board, in seconds.
const fn default_min_interval_secs() -> u64 {
    30
}

/// Default number of automatic confirmation/cookie re-submissions.
const fn default_max_confirmation_rounds() -> u32 {
    2
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PostingConfig {
    /// Client-side rate-limiter window per board.
    #[serde(default = "default_min_interval_secs")]
    pub min_interval_secs: u64,

    /// Re-submissions allowed after a confirmation or cookie page.
    #[serde(default = "default_max_confirmation_rounds")]
    pub max_confirmation_rounds: u32,
}

impl Default for PostingConfig {
    fn default() -> Self {
        Self {
            min_interval_secs: default_min_interval_secs(),
            max_confirmation_rounds: default_max_confirmation_rounds(),
        }
    }
}

impl PostingConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the round bound is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_confirmation_rounds > 5 {
            return Err(ConfigError::invalid(
                "posting.max_confirmation_rounds",
                "must not exceed 5",
            ));
        }
        Ok(())
    }
}
