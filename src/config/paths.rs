//! Config file location for bankbridge
//!
//! ## Resolution Order
//!
//! 1. `--config <PATH>` on the command line
//! 2. `BANKBRIDGE_CONFIG` environment variable (read by clap into the same flag)
//! 3. `./config.yaml` in the working directory, if it exists
//! 4. `<platform config dir>/bankbridge/config.yaml`

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::error::{BridgeError, BridgeResult};

/// Name of the config file looked up in the working and config directories
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Where a config path came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// Passed with `--config` or `BANKBRIDGE_CONFIG`
    Explicit,
    /// Found in the working directory
    WorkingDir,
    /// Platform config directory
    UserConfigDir,
}

/// Resolved location of the configuration document
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    config_file: PathBuf,
    source: ConfigSource,
}

impl ConfigPaths {
    /// Resolve the config file location
    ///
    /// # Errors
    ///
    /// Returns an error if no explicit path is given, there is no
    /// `./config.yaml`, and the platform config directory cannot be determined.
    pub fn resolve(explicit: Option<PathBuf>) -> BridgeResult<Self> {
        Self::resolve_in(explicit, Path::new("."))
    }

    fn resolve_in(explicit: Option<PathBuf>, working_dir: &Path) -> BridgeResult<Self> {
        if let Some(config_file) = explicit {
            return Ok(Self {
                config_file,
                source: ConfigSource::Explicit,
            });
        }

        let local = working_dir.join(CONFIG_FILE_NAME);
        if local.is_file() {
            return Ok(Self {
                config_file: local,
                source: ConfigSource::WorkingDir,
            });
        }

        let dirs = ProjectDirs::from("", "", "bankbridge").ok_or_else(|| {
            BridgeError::Io("Could not determine the user config directory".into())
        })?;
        Ok(Self {
            config_file: dirs.config_dir().join(CONFIG_FILE_NAME),
            source: ConfigSource::UserConfigDir,
        })
    }

    /// Create ConfigPaths for a known file (useful for testing)
    pub fn with_file(config_file: PathBuf) -> Self {
        Self {
            config_file,
            source: ConfigSource::Explicit,
        }
    }

    /// Path of the configuration document
    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// How the path was chosen
    pub fn source(&self) -> ConfigSource {
        self.source
    }
}
