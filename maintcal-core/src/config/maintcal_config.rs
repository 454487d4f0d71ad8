//! Process configuration.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{MaintCalError, MaintCalResult};

static DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:4096";
static DEFAULT_UID_DOMAIN: &str = "maintcal";
static DEFAULT_CALENDAR_NAME: &str = "Maintenance";

fn default_bind_address() -> String {
    DEFAULT_BIND_ADDRESS.to_string()
}

fn default_uid_domain() -> String {
    DEFAULT_UID_DOMAIN.to_string()
}

fn default_calendar_name() -> String {
    DEFAULT_CALENDAR_NAME.to_string()
}

/// Configuration at ~/.config/maintcal/config.toml, overridable with
/// `MAINTCAL_*` environment variables (e.g. `MAINTCAL_BIND_ADDRESS`).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MaintCalConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// TOML file with locations, assets, PM schedules and completions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_file: Option<PathBuf>,

    /// Domain part of calendar feed UIDs
    #[serde(default = "default_uid_domain")]
    pub feed_uid_domain: String,

    #[serde(default = "default_calendar_name")]
    pub feed_calendar_name: String,
}

impl Default for MaintCalConfig {
    fn default() -> Self {
        MaintCalConfig {
            bind_address: default_bind_address(),
            seed_file: None,
            feed_uid_domain: default_uid_domain(),
            feed_calendar_name: default_calendar_name(),
        }
    }
}

impl MaintCalConfig {
    pub fn config_path() -> MaintCalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| MaintCalError::Config("Could not determine config directory".into()))?
            .join("maintcal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, writing a commented template first
    /// if no config file exists yet.
    pub fn load() -> MaintCalResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from `path` (which may be missing), layered with the environment.
    pub fn load_from(path: &Path) -> MaintCalResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("MAINTCAL"))
            .build()
            .map_err(|e| MaintCalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| MaintCalError::Config(e.to_string()))
    }

    /// Seed file path with `~` expanded.
    pub fn seed_path(&self) -> Option<PathBuf> {
        self.seed_file.as_ref().map(|p| {
            PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).into_owned())
        })
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> MaintCalResult<()> {
        let contents = format!(
            "\
# maintcal configuration

# Address the HTTP server listens on:
# bind_address = \"{}\"

# Locations, assets, PM schedules and completions to load at startup.
# Dates inside the seed file are quoted strings (\"2025-06-01\").
# seed_file = \"~/maintcal/seed.toml\"

# Calendar feed settings:
# feed_uid_domain = \"{}\"
# feed_calendar_name = \"{}\"
",
            DEFAULT_BIND_ADDRESS, DEFAULT_UID_DOMAIN, DEFAULT_CALENDAR_NAME
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                MaintCalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| MaintCalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
