//! Runtime configuration: API credentials and the on-disk data root.

use crate::error::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const API_KEY_VAR: &str = "NEOPLE_API_KEY";
pub const DATA_PATH_VAR: &str = "DATA_PATH";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    /// Root directory holding `<jobName>/<jobGrowName>.json` cache files.
    pub data_path: PathBuf,
    pub timeout: Duration,
}

impl Config {
    /// Validates raw settings. Both the key and the data root are required and
    /// must be non-empty; nothing touches the network or disk here.
    pub fn new(
        api_key: Option<String>,
        data_path: Option<PathBuf>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(Error::Config(API_KEY_VAR))?;
        let data_path = data_path
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(Error::Config(DATA_PATH_VAR))?;

        Ok(Self {
            api_key,
            data_path,
            timeout: timeout.unwrap_or(DEFAULT_TIMEOUT),
        })
    }

    /// Reads settings straight from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::new(
            std::env::var(API_KEY_VAR).ok(),
            std::env::var_os(DATA_PATH_VAR).map(PathBuf::from),
            None,
        )
    }

    /// Location of the hand-curated skill meta files.
    pub fn meta_path(&self) -> PathBuf {
        self.data_path.join("meta")
    }
}
