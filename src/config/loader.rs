// Configuration file loading

use super::AppConfig;
use anyhow::{anyhow, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Resolves and reads the TOML config file
pub struct ConfigLoader {
    path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Loader for the default location under the user config directory
    pub fn new() -> Self {
        Self {
            path: Self::default_config_path(),
        }
    }

    /// Loader for an explicit path (`--config`)
    pub fn with_path(path: &Path) -> Self {
        Self {
            path: Some(path.to_path_buf()),
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ideation-agent").join("config.toml"))
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Load the config, falling back to defaults when no file exists
    pub fn load(&self) -> Result<AppConfig> {
        match &self.path {
            Some(path) => Ok(self.load_from_path(path)?.unwrap_or_default()),
            None => Ok(AppConfig::default()),
        }
    }

    pub fn load_from_path(&self, path: &Path) -> Result<Option<AppConfig>> {
        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(None);
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: AppConfig = toml::from_str(&contents)
            .map_err(|e| anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;

        config.validate()?;
        log::info!("Loaded config from {}", path.display());

        Ok(Some(config))
    }

    pub fn save(&self, config: &AppConfig) -> Result<()> {
        let path = self
            .path
            .as_deref()
            .ok_or_else(|| anyhow!("No config path available"))?;

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    anyhow!("Failed to create config directory '{}': {}", parent.display(), e)
                })?;
            }
        }

        config.validate()?;

        let contents = toml::to_string_pretty(config)
            .map_err(|e| anyhow!("Failed to serialize config: {}", e))?;
        fs::write(path, contents)
            .map_err(|e| anyhow!("Failed to write config file '{}': {}", path.display(), e))?;

        log::info!("Saved config to: {}", path.display());
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
