//! Bootstrap data loaded once at startup.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_LOCATION_ID, DEFAULT_LOCATION_NAME};
use crate::error::{MaintCalError, MaintCalResult};
use crate::ledger::CompletionRecord;
use crate::obligation::{Asset, Location, PmSchedule};

/// Records to populate a store with, read from a TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub pm_schedules: Vec<PmSchedule>,
    #[serde(default)]
    pub completions: Vec<CompletionRecord>,
}

impl SeedData {
    pub fn load(path: &Path) -> MaintCalResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> MaintCalResult<Self> {
        toml::from_str(content).map_err(|e| MaintCalError::Config(e.to_string()))
    }

    /// Seeded locations, or the single default facility if none are listed.
    pub fn locations_or_default(&self) -> Vec<Location> {
        if self.locations.is_empty() {
            vec![Location {
                id: DEFAULT_LOCATION_ID,
                name: DEFAULT_LOCATION_NAME.to_string(),
            }]
        } else {
            self.locations.clone()
        }
    }
}
