use std::{
    fs,
    path::{Path, PathBuf},
};

use color_eyre::Result;
use dirs::config_dir;
use serde::{Deserialize, Serialize};

/// User-level configuration loaded from `~/.config/fsvault/config.toml` (platform-specific).
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Override for the storage location (platform data directory otherwise).
    pub location: Option<String>,
    /// Override for the storage folder name.
    pub folder: Option<String>,
    /// Keyring service holding the encryption key.
    pub keyring_service: Option<String>,
}

impl Config {
    /// Apply command-line overrides on top of the file values.
    pub fn with_overrides(mut self, location: Option<String>, folder: Option<String>) -> Self {
        if location.is_some() {
            self.location = location;
        }
        if folder.is_some() {
            self.folder = folder;
        }
        self
    }
}

/// Load config from the default path; if missing, return defaults.
pub fn load() -> Result<Config> {
    let path = default_path()?;
    load_from_path(path)
}

/// Load config from a given path; if missing or empty, return defaults.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    let cfg: Config = toml::from_str(&contents)?;
    Ok(cfg)
}

/// Resolve the default config path (platform aware).
pub fn default_path() -> Result<PathBuf> {
    let base = config_dir().ok_or_else(|| color_eyre::eyre::eyre!("no config dir available"))?;
    Ok(base.join("fsvault").join("config.toml"))
}

/// Write the config to the default path unless a file is already there.
pub fn write_default_if_missing(config: &Config) -> Result<PathBuf> {
    write_if_missing(config, &default_path()?)
}

fn write_if_missing(config: &Config, path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Ok(path.to_path_buf());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = toml::to_string_pretty(config)?;
    fs::write(path, body)?;
    Ok(path.to_path_buf())
}
