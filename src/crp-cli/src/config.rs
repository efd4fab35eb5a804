//! Configuration management for crp CLI

use anyhow::{Context, Result};
use crp::OrganizeConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub organize: OrganizeConfig,
    pub extract: ExtractConfig,
}

/// Where to find the external extractor
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ExtractConfig {
    pub dotnet: Option<PathBuf>,
    pub parser_dir: Option<PathBuf>,
}

impl Config {
    /// Get the path to the default config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("crp");

        Ok(config_dir.join("config.toml"))
    }

    /// Load configuration
    ///
    /// An explicit path must exist. The default location is optional and
    /// falls back to built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let Ok(path) = Self::config_path() else {
                    return Ok(Config::default());
                };
                if !path.exists() {
                    return Ok(Config::default());
                }
                path
            }
        };

        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file {}", config_path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}
