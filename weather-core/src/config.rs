use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use crate::source::SourceId;

/// Location shown when the user has not picked one.
pub const DEFAULT_LOCATION: &str = "Paris";

/// Configuration for a single forecast source (e.g., API key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub api_key: String,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Optional default source id, e.g. "open-meteo" or "weatherapi".
    pub default_source: Option<String>,

    /// Location loaded on startup; [`DEFAULT_LOCATION`] when absent.
    pub default_location: Option<String>,

    /// Example TOML:
    /// [sources.weatherapi]
    /// api_key = "..."
    #[serde(default)]
    pub sources: HashMap<String, SourceConfig>,
}

impl Config {
    /// Return the default source as a strongly-typed SourceId.
    ///
    /// Falls back to Open-Meteo, which needs no credentials.
    pub fn default_source_id(&self) -> Result<SourceId> {
        match self.default_source.as_deref() {
            Some(s) => SourceId::try_from(s).with_context(|| {
                "Invalid default source in config.\n\
                 Hint: run `myweather configure <source>` (e.g. `myweather configure open-meteo`)."
            }),
            None => Ok(SourceId::OpenMeteo),
        }
    }

    pub fn default_location(&self) -> &str {
        self.default_location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_LOCATION)
    }

    pub fn set_default_location(&mut self, location: &str) {
        self.default_location = Some(location.trim().to_string());
    }

    /// Store default source as string.
    pub fn set_default_source(&mut self, id: SourceId) {
        self.default_source = Some(id.as_str().to_string());
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("fr", "ekito", "myweather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Convenience helper: set/replace a source API key and set it as default if none is.
    pub fn upsert_source_api_key(&mut self, source_id: SourceId, api_key: String) {
        self.sources.insert(source_id.as_str().to_string(), SourceConfig { api_key });

        if self.default_source.is_none() {
            self.default_source = Some(source_id.to_string());
        }
    }

    /// Returns API key for a source, if present.
    pub fn source_api_key(&self, source_id: SourceId) -> Option<&str> {
        self.sources.get(source_id.as_str()).map(|cfg| cfg.api_key.as_str())
    }

    pub fn is_source_configured(&self, source_id: SourceId) -> bool {
        !source_id.requires_api_key() || self.source_api_key(source_id).is_some()
    }
}
