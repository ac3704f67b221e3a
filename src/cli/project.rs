//! Project discovery: config file, directories, stage.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pagebars::config::{ConfigError, FileConfig, find_config_file};
use pagebars::{Stage, debug};

/// A loaded `pagebars.toml` and the directories derived from it.
#[derive(Debug)]
pub struct Project {
    pub config_path: PathBuf,
    pub config: FileConfig,
    /// Directory containing the config file.
    pub base: PathBuf,
}

impl Project {
    /// Find `config_name` upward from `start` and load it.
    pub fn discover(config_name: &Path, start: &Path) -> Result<Self> {
        let config_path = find_config_file(config_name, start)
            .ok_or_else(|| ConfigError::NotFound(config_name.to_path_buf()))
            .with_context(|| format!("searched {} and its parents", start.display()))?;
        Self::load(&config_path)
    }

    pub fn load(config_path: &Path) -> Result<Self> {
        let config = FileConfig::from_path(config_path)?;
        let base = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        debug!("config"; "loaded {}", config_path.display());

        Ok(Self {
            config_path: config_path.to_path_buf(),
            config,
            base,
        })
    }

    pub fn root(&self) -> PathBuf {
        self.config.root_dir(&self.base)
    }

    pub fn pages_dir(&self) -> PathBuf {
        self.config.pages_dir(&self.base)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.config.output_dir(&self.base)
    }

    /// Build a stage and tell it the root.
    pub fn stage(&self) -> Result<Stage> {
        let mut stage = Stage::new(self.config.to_stage_config(&self.base)?);
        stage.config_resolved(&self.root());
        Ok(stage)
    }
}
