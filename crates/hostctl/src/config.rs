use std::path::{Path, PathBuf};

use hostctl_core::SystemPaths;
use serde::Deserialize;

use crate::error::{CliError, Result};

const DEFAULT_CONFIG_PATH: &str = "/etc/hostctl.toml";

/// Panel configuration, loaded from a TOML file.
///
/// All fields have defaults, so an absent file yields a fully working
/// configuration for a stock Debian-style host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Actor recorded in the audit trail.
    pub actor: String,
    /// Audit trail destination (JSON lines, append-only).
    pub audit_log: PathBuf,
    /// Filesystem layout the workflows provision into.
    pub paths: SystemPaths,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            actor: "hostctl".to_string(),
            audit_log: PathBuf::from("/var/log/hostctl/audit.jsonl"),
            paths: SystemPaths::default(),
        }
    }
}

impl Config {
    /// Load from `path`, or from `/etc/hostctl.toml` when no path is given;
    /// a missing default file yields the default configuration.
    ///
    /// # Errors
    ///
    /// An explicitly given path must exist and parse; the default path only
    /// needs to parse when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::read(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if default.exists() {
                    Self::read(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| CliError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}
