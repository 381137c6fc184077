//! Configuration loading and management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use sw_core::Naming;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Re-render interval for `sw watch`, in milliseconds.
    pub tick_interval_ms: u64,

    /// Prefix of default head channel names.
    pub head_name_prefix: String,

    /// Prefix of default sub channel names.
    pub sub_name_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        let naming = Naming::default();
        Self {
            database_path: data_dir.join("sw.db"),
            tick_interval_ms: 1_000,
            head_name_prefix: naming.head_prefix,
            sub_name_prefix: naming.sub_prefix,
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (SW_*)
        figment = figment.merge(Env::prefixed("SW_"));

        figment.extract()
    }

    /// Default-name prefixes for new channels.
    pub fn naming(&self) -> Naming {
        Naming {
            head_prefix: self.head_name_prefix.clone(),
            sub_prefix: self.sub_name_prefix.clone(),
        }
    }

    /// Interval between `sw watch` frames. Never zero.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

/// Returns the platform-specific config directory for sw.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("sw"))
}

/// Returns the platform-specific data directory for sw.
///
/// On Linux: `~/.local/share/sw`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("sw"))
}
