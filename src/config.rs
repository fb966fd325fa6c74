//! User-level tool settings, read from `~/.workstate/workstate.toml`.
//!
//! These are defaults for the command surface, not the per-project
//! descriptor (see [`crate::workflow::WorkflowConfig`]).

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{wlog_debug, Error, Result};

pub const DEFAULT_MAX_FILES_PER_TASK: u32 = 8;
pub const DEFAULT_MAX_HOURS_PER_TASK: u32 = 3;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    pub max_files_per_task: Option<u32>,
    pub max_hours_per_task: Option<u32>,
    pub capture_revision: Option<bool>,
    /// Project-relative archive root, replacing `docs/workflow/archive`.
    pub archive_dir: Option<String>,
}

impl Config {
    pub fn workstate_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir().ok_or(Error::NoHomeDir)?.join(".workstate"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::workstate_dir()?.join("workstate.toml"))
    }

    pub fn effective_max_files(&self) -> u32 {
        self.max_files_per_task
            .unwrap_or(DEFAULT_MAX_FILES_PER_TASK)
    }

    pub fn effective_max_hours(&self) -> u32 {
        self.max_hours_per_task
            .unwrap_or(DEFAULT_MAX_HOURS_PER_TASK)
    }

    pub fn effective_capture_revision(&self) -> bool {
        self.capture_revision.unwrap_or(true)
    }

    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Ok(path) => Self::load_from(&path),
            Err(Error::NoHomeDir) => {
                wlog_debug!("No home directory, using default settings");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        wlog_debug!("Config::load path={}", path.display());
        if !path.exists() {
            wlog_debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(&fs::read_to_string(path)?)?;
        config.validate()?;
        wlog_debug!(
            "Config loaded: max_files={:?}, max_hours={:?}, capture_revision={:?}, archive_dir={:?}",
            config.max_files_per_task,
            config.max_hours_per_task,
            config.capture_revision,
            config.archive_dir
        );
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.max_files_per_task == Some(0) || self.max_hours_per_task == Some(0) {
            return Err(Error::Config(
                "task constraints in workstate.toml must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
