//! Where weightlog keeps its files.
//!
//! Everything lives in one data directory (`~/.weightlog` unless overridden).
//! An optional `config.toml` in that directory can rename the storage files
//! and change the default date range.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

const DATA_DIR_NAME: &str = ".weightlog";
const CONFIG_FILE_NAME: &str = "config.toml";
pub const LOG_FILE_NAME: &str = "weightlog.log";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
struct FileConfig {
    primary_file: String,
    legacy_file: String,
    default_range_days: u32,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            primary_file: "weight_data.csv".to_string(),
            legacy_file: "weight_data.json".to_string(),
            default_range_days: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub primary_path: PathBuf,
    pub legacy_path: PathBuf,
    pub default_range_days: u32,
}

impl Config {
    /// Resolve the data directory, create it, and read `config.toml` if present.
    pub fn load(base_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = match base_dir {
            Some(dir) => dir,
            None => dirs::home_dir()
                .ok_or(Error::HomeDirUnavailable)?
                .join(DATA_DIR_NAME),
        };
        fs::create_dir_all(&data_dir).map_err(|e| Error::io(&data_dir, e))?;

        let file = read_file_config(&data_dir.join(CONFIG_FILE_NAME))?;
        Ok(Self {
            primary_path: data_dir.join(&file.primary_file),
            legacy_path: data_dir.join(&file.legacy_file),
            default_range_days: file.default_range_days,
            data_dir,
        })
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(FileConfig::default());
    }
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    toml::from_str(&content).map_err(|e| Error::Config {
        path: path.to_path_buf(),
        source: Box::new(e),
    })
}
