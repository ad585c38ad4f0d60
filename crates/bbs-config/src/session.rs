//! Session token settings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Static session token for authenticated archive access and posting.
    /// Empty means "no session".
    #[serde(default)]
    pub token: String,
}

impl SessionConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.token.trim().is_empty()
    }
}
