//! Client configuration
//!
//! Read from `$SMARTFS_CONFIG` when set, otherwise from
//! `~/.config/smartfs/config.toml`. A missing default file means defaults.
//!
//! ```toml
//! [attributes]
//! namespace = "user.smartfs"
//! backend = "auto"
//!
//! [snapshot]
//! default_message = "Manual Snapshot"
//!
//! [recover]
//! mode = "atomic"
//! ```

use crate::commands::RecoverMode;
use crate::protocol::{AttributeNames, DEFAULT_NAMESPACE};
use crate::xattr::Backend;
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "SMARTFS_CONFIG";

pub const DEFAULT_SNAPSHOT_MESSAGE: &str = "Manual Snapshot";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub attributes: AttributesSection,
    pub snapshot: SnapshotSection,
    pub recover: RecoverSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AttributesSection {
    /// Prefix of the `versions`, `snapshot` and `pin` attributes
    pub namespace: String,
    pub backend: Backend,
}

impl Default for AttributesSection {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            backend: Backend::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SnapshotSection {
    /// Message used when `snapshot` is run without `-m`
    pub default_message: String,
}

impl Default for SnapshotSection {
    fn default() -> Self {
        Self {
            default_message: DEFAULT_SNAPSHOT_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RecoverSection {
    pub mode: RecoverMode,
}

impl Config {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("smartfs").join("config.toml"))
    }

    /// Load from `$SMARTFS_CONFIG` or the default location
    pub fn load() -> Result<Self, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Self::from_file(Path::new(&path));
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading config from {:?}", path);
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn attribute_names(&self) -> AttributeNames {
        AttributeNames::new(&self.attributes.namespace)
    }
}
