use crate::error::{JurnalError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Overrides the data file from the environment
pub const DATA_FILE_ENV: &str = "JURNAL_DATA_FILE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_file: Option<PathBuf>,
    pub pad_width: u32,
    pub pad_height: u32,
    pub autosave_delay_ms: u64,
    /// Same order of magnitude as a browser's localStorage
    pub storage_quota_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: None,
            pad_width: 400,
            pad_height: 200,
            autosave_delay_ms: 2000,
            storage_quota_bytes: 5 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| JurnalError::Config("direktori home tidak ditemukan".into()))?;
        Ok(home.join(".config").join("jurnal-bimbingan").join("config.json"))
    }

    /// Environment variable, then config file, then the platform data dir.
    pub fn data_file(&self) -> Result<PathBuf> {
        if let Ok(path) = std::env::var(DATA_FILE_ENV) {
            if !path.trim().is_empty() {
                return Ok(PathBuf::from(path));
            }
        }

        if let Some(path) = &self.data_file {
            return Ok(path.clone());
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| JurnalError::Config("direktori data tidak ditemukan".into()))?;
        Ok(data_dir.join("jurnal-bimbingan").join("jurnal.json"))
    }

    pub fn set_data_file(&mut self, path: PathBuf) -> Result<()> {
        self.data_file = Some(path);
        self.save()
    }

    pub fn autosave_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.autosave_delay_ms)
    }
}
