use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanchangConfig {
    /// Base URL of the panchang backend, e.g. "https://api.example.com"
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Target language for display text; "en" skips translation entirely.
    #[serde(default = "default_language")]
    pub language: String,
    /// Fixed coordinates. Both must be set for the engine to fetch;
    /// otherwise the CLI reports the awaiting-location state.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

fn default_api_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for PanchangConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            language: default_language(),
            latitude: None,
            longitude: None,
        }
    }
}

impl PanchangConfig {
    pub fn config_path() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Cannot determine config directory")?
            .join("panchang-cli")
            .join("config.toml"))
    }

    /// Load config from disk. Returns default config if file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;
        Ok(config)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(&path, raw)?;
        Ok(())
    }
}
