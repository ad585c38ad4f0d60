//! # bbs-config
//!
//! Layered configuration loading for bbsync using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`BBSYNC_*` prefix, `__` as separator)
//! 2. Project-level `.bbsync/config.toml`
//! 3. User-level `~/.config/bbsync/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `BBSYNC_TRANSPORT__USER_AGENT` -> `transport.user_agent`,
//! `BBSYNC_POSTING__MIN_INTERVAL_SECS` -> `posting.min_interval_secs`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use bbs_config::BbsConfig;
//!
//! let config = BbsConfig::load_with_dotenv().expect("config");
//! println!("mirror root: {}", config.store.root.display());
//! ```

mod error;
mod posting;
mod session;
mod store;
mod transport;

pub use error::ConfigError;
pub use posting::PostingConfig;
pub use session::SessionConfig;
pub use store::StoreConfig;
pub use transport::{MAX_ATTEMPTS_CEILING, TransportConfig};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BbsConfig {
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub posting: PostingConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl BbsConfig {
    /// Load configuration from all sources (TOML files + environment variables)
    /// and validate it.
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if extraction or validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if extraction or validation fails.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can add providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        let local_path = PathBuf::from(".bbsync/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("BBSYNC_").split("__"))
    }

    /// Check every section.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::InvalidValue`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.transport.validate()?;
        self.posting.validate()
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("bbsync").join("config.toml"))
    }
}
