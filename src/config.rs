// SPDX-License-Identifier: GPL-3.0-only
//! Optional on-disk configuration
//!
//! Read from `<config dir>/monitor-control/config.json`, or from the file
//! named by `MONITOR_CONTROL_CONFIG`. A missing file means defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::vcp::FALLBACK_PROBE_CODES;

pub const CONFIG_ENV: &str = "MONITOR_CONTROL_CONFIG";
const CONFIG_DIR: &str = "monitor-control";
const CONFIG_FILE: &str = "config.json";

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Config {
    /// Ask the OS for friendly display names before falling back to the
    /// capability string model
    pub name_lookup: bool,
    /// Codes probed when a monitor declares no capabilities
    pub fallback_probe_codes: Vec<u8>,
    /// tracing filter directive, used when `RUST_LOG` is unset
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name_lookup: true,
            fallback_probe_codes: FALLBACK_PROBE_CODES.to_vec(),
            log_filter: None,
        }
    }
}

impl Config {
    /// Load the configuration, returning the defaults alongside the error
    /// when the file exists but cannot be used.
    pub fn load() -> Result<Self, (AppError, Self)> {
        match config_path() {
            Some(path) => Self::from_path(&path).map_err(|err| (err, Self::default())),
            None => Ok(Self::default()),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(AppError::Config {
                    path: path.to_path_buf(),
                    reason: err.to_string(),
                });
            }
        };

        serde_json::from_str(&text).map_err(|err| AppError::Config {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    }
}

fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}
