//! # Configuration
//!
//! Storage-location resolution for the reminder core.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;

use crate::scheduler;

/// Settings the host hands to the plugin.
#[derive(Debug, Clone, Deserialize)]
pub struct RemindConfig {
    /// Base storage directory of the host.
    pub homedir: PathBuf,
    /// Filename stem for the reminder file, usually the host's config
    /// basename.
    pub basename: String,
    /// Optional folder for the reminder file. A relative path is resolved
    /// under `homedir`; an absolute path is used verbatim. Defaults to
    /// `homedir` itself.
    #[serde(default)]
    pub location: Option<PathBuf>,
    /// Seconds between delivery sweeps.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

fn default_sweep_interval() -> u64 {
    scheduler::SWEEP_INTERVAL_SECS
}

impl RemindConfig {
    pub fn new(homedir: impl Into<PathBuf>, basename: impl Into<String>) -> Self {
        Self {
            homedir: homedir.into(),
            basename: basename.into(),
            location: None,
            sweep_interval_secs: default_sweep_interval(),
        }
    }

    /// Load settings from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&text)?)
    }

    /// Path of the reminder file: `<location or homedir>/<basename>.reminder.csv`.
    pub fn reminder_filename(&self) -> PathBuf {
        let dir = match &self.location {
            Some(location) => self.homedir.join(location),
            None => self.homedir.clone(),
        };
        dir.join(format!("{}.reminder.csv", self.basename))
    }

    /// Where the legacy built-in plugin kept its tab-separated database.
    pub fn legacy_filename(&self) -> PathBuf {
        self.homedir.join(format!("{}.reminders.db", self.basename))
    }
}
