//! Configuration model for profgate.
//!
//! This module defines the Config struct that represents `config.yaml` at the
//! profgate root. It supports forward-compatible YAML parsing (unknown fields
//! are ignored), sensible defaults for optional fields, and validation of
//! config values. A missing config file yields the defaults.

use crate::error::{ProfgateError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for profgate.
///
/// This struct represents the contents of `{root}/config.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding per-profile record directories, overriding the
    /// default `access-control` directory under the root. A relative path
    /// is interpreted relative to the root.
    pub access_control_dir: Option<String>,

    /// Whether administrative commands append events to the audit log.
    #[serde(default = "default_true")]
    pub audit_log: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            access_control_dir: None,
            audit_log: true,
        }
    }
}

impl Config {
    /// Load the config from a YAML file.
    ///
    /// A missing file is not an error: defaults are returned so that a fresh
    /// root works without any setup step.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            ProfgateError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = serde_yaml::from_str(&content).map_err(|e| {
            ProfgateError::UserError(format!(
                "failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate config values.
    pub fn validate(&self) -> Result<()> {
        if let Some(dir) = &self.access_control_dir
            && dir.is_empty()
        {
            return Err(ProfgateError::UserError(
                "config: access_control_dir must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
