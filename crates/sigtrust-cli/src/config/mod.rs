//! Configuration management.

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

/// CLI configuration, read from `config.toml` in the platform config dir.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Default trust-list container.
    pub trust_list: Option<PathBuf>,

    /// Default output format.
    pub output_format: Option<OutputFormat>,

    /// Require roots to verify their own signature.
    #[serde(default)]
    pub strict_roots: bool,
}

impl Config {
    /// Get the config file path.
    pub fn path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("is", "i1", "sigtrust")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from file; a missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;

        Ok(config)
    }
}
