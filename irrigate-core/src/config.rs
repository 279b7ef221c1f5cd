use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::advisory::Thresholds;

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// OpenWeatherMap API key; absent means simulated demo data.
    pub api_key: Option<String>,

    /// City used when a command names none.
    pub default_city: Option<String>,

    /// Example TOML:
    /// [thresholds]
    /// high_moisture = 70.0
    /// high_rain_chance = 60
    #[serde(default)]
    pub thresholds: Thresholds,
}

impl Config {
    /// Whether a live API key is configured and non-blank.
    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    /// Returns the API key, treating a blank entry as absent.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Store or clear the API key; a blank string clears it.
    pub fn set_api_key(&mut self, key: Option<String>) {
        self.api_key = key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty());
    }

    pub fn default_city(&self) -> Option<&str> {
        self.default_city
            .as_deref()
            .map(str::trim)
            .filter(|city| !city.is_empty())
    }

    pub fn set_default_city(&mut self, city: Option<String>) {
        self.default_city = city.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "irrigate", "irrigate-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
