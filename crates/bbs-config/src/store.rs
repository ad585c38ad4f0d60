//! Local mirror location.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_root() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bbsync")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Directory holding per-board indexes and raw thread content.
    #[serde(default = "default_root")]
    pub root: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
        }
    }
}
