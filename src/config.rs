//! Tool Configuration
//!
//! Optional TOML file; every key has a default so an empty or missing file
//! is a valid configuration.
//!
//! ```toml
//! [assembly]
//! placeholder_item = "Apple"
//!
//! [catalog]
//! data_dir = "data"
//! watch = false
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::quest::AssemblyOptions;

pub const DEFAULT_CONFIG_FILE: &str = "quest-authoring.toml";

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogConfig {
    /// Root data directory; quests are read from `<data_dir>/quests`
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Reload the catalog when quest files change
    #[serde(default)]
    pub watch: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            watch: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AuthoringConfig {
    #[serde(default)]
    pub assembly: AssemblyOptions,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl AuthoringConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Load from `path`, falling back to defaults if the file does not exist
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            warn!("Config file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {:?}: {}", path, e))?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| format!("{:?}: {}", path, e))?;

        info!("Loaded config from {:?}", path);
        Ok(config)
    }
}
