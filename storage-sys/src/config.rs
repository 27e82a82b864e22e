// SPDX-License-Identifier: GPL-3.0-only

//! Helper configuration
//!
//! Read from `/etc/storage-expand/config.toml`; debug builds also honour
//! `STORAGE_EXPAND_CONFIG`. A missing file yields the defaults. The file
//! picks the binaries run as root, so it must be owned by root and not
//! writable by group or others.
//!
//! ```toml
//! log_level = "info"
//! mounts_path = "/proc/self/mounts"
//!
//! [tools]
//! parted = "/usr/sbin/parted"
//! resize2fs = "resize2fs"
//! btrfs = "btrfs"
//! ```

use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_ENV: &str = "STORAGE_EXPAND_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "/etc/storage-expand/config.toml";

const ROOT_UID: u32 = 0;
const GROUP_OR_OTHER_WRITE: u32 = 0o022;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {reason}")]
    Read { path: PathBuf, reason: String },
    #[error("invalid config {path:?}: {reason}")]
    Invalid { path: PathBuf, reason: String },
    #[error("untrusted config {path:?}: {reason}")]
    Untrusted { path: PathBuf, reason: String },
}

/// Refuse a config file not owned by `owner` or writable by group/others
fn check_trusted(path: &Path, uid: u32, mode: u32, owner: u32) -> Result<(), ConfigError> {
    let untrusted = |reason: String| ConfigError::Untrusted {
        path: path.to_path_buf(),
        reason,
    };

    if uid != owner {
        return Err(untrusted(format!("owned by uid {uid}, expected {owner}")));
    }
    if mode & GROUP_OR_OTHER_WRITE != 0 {
        return Err(untrusted(format!(
            "mode {:o} is writable by group or others",
            mode & 0o7777
        )));
    }
    Ok(())
}

/// Program names (resolved through `PATH`) or absolute paths of the tools
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub parted: String,
    pub resize2fs: String,
    pub btrfs: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            parted: "parted".to_string(),
            resize2fs: "resize2fs".to_string(),
            btrfs: "btrfs".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpandConfig {
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: Option<String>,
    pub tools: ToolPaths,
    /// Mount table consulted to find a btrfs mount point
    pub mounts_path: PathBuf,
}

impl Default for ExpandConfig {
    fn default() -> Self {
        Self {
            log_level: None,
            tools: ToolPaths::default(),
            mounts_path: PathBuf::from("/proc/self/mounts"),
        }
    }
}

impl ExpandConfig {
    /// Path of the config file; the environment override is debug-only
    pub fn config_path() -> PathBuf {
        #[cfg(debug_assertions)]
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return PathBuf::from(path);
        }
        PathBuf::from(DEFAULT_CONFIG_PATH)
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load a root-owned config file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::load_owned_by(path, ROOT_UID)
    }

    fn load_owned_by(path: &Path, owner: u32) -> Result<Self, ConfigError> {
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(error) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    reason: error.to_string(),
                });
            }
        };
        check_trusted(path, metadata.uid(), metadata.mode(), owner)?;

        let raw = fs::read_to_string(path).map_err(|error| ConfigError::Read {
            path: path.to_path_buf(),
            reason: error.to_string(),
        })?;

        Self::parse(&raw).map_err(|reason| ConfigError::Invalid {
            path: path.to_path_buf(),
            reason,
        })
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        toml::from_str(raw).map_err(|error| error.to_string())
    }
}
