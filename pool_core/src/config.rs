//! Configuration file support for pooldose.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/pooldose/config.toml`.

use crate::{DosingPolicy, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub dosing: DosingPolicy,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Pool registry configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Registry CSV; relative paths are resolved against the data directory
    #[serde(default = "default_registry_file")]
    pub file: PathBuf,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            file: default_registry_file(),
        }
    }
}

impl RegistryConfig {
    /// Absolute (or data-dir relative) location of the registry file
    pub fn resolve(&self, data_dir: &Path) -> PathBuf {
        if self.file.is_absolute() {
            self.file.clone()
        } else {
            data_dir.join(&self.file)
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pooldose")
}

fn default_registry_file() -> PathBuf {
    PathBuf::from("pools.csv")
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pooldose")
            .join("config.toml")
    }

    /// Reject maintenance targets the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        use crate::MaintenancePolicy;

        let targets = match self.dosing.maintenance {
            MaintenancePolicy::Fixed { target_mgl } => vec![target_mgl],
            MaintenancePolicy::ByOccupancy {
                occupied_mgl,
                vacant_mgl,
            } => vec![occupied_mgl, vacant_mgl],
        };
        if let Some(bad) = targets.iter().find(|t| !t.is_finite() || **t < 0.0) {
            return Err(Error::Config(format!(
                "maintenance target must be 0 mg/l or more, got {}",
                bad
            )));
        }
        Ok(())
    }

    /// Path of the pool registry file
    pub fn registry_path(&self) -> PathBuf {
        self.registry.resolve(&self.data.data_dir)
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
