//! Root and profile path resolution for profgate.
//!
//! This module provides the environment-resolution layer that locates the
//! profgate root directory and derives the per-profile record directory
//! underneath it.
//!
//! All profgate commands must use this module to locate record state, so that
//! operations always target the same record tree regardless of where the
//! command is invoked from. Resolution order for the root:
//!
//! 1. An explicit directory (the `--root` flag)
//! 2. The `PROFGATE_ROOT` environment variable
//! 3. `$HOME/.profgate` (Windows: `%USERPROFILE%\.profgate`)

use crate::config::Config;
use crate::error::{ProfgateError, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable overriding the profgate root directory.
pub const ROOT_ENV_VAR: &str = "PROFGATE_ROOT";

/// Default root directory name within the user's home directory.
pub const DEFAULT_ROOT_DIR: &str = ".profgate";

/// Directory under the root holding per-profile record directories.
pub const ACCESS_CONTROL_DIR: &str = "access-control";

/// Config file name within the root directory.
pub const CONFIG_FILE: &str = "config.yaml";

/// Audit log file name within the root directory.
pub const EVENTS_FILE: &str = "events.ndjson";

/// Resolved paths for a single profile's coordination state.
///
/// All paths are absolute once the root is.
#[derive(Debug, Clone)]
pub struct ProfileContext {
    /// The profgate root directory.
    pub root: PathBuf,

    /// The profile name this context refers to.
    pub profile: String,

    /// Directory holding this profile's access and lock records
    /// (default: `{root}/access-control/{profile}/`).
    pub records_dir: PathBuf,
}

impl ProfileContext {
    /// Resolve the context for `profile` under an already-resolved root.
    ///
    /// The config's `access_control_dir` may relocate the record tree;
    /// a relative value is interpreted relative to the root.
    pub fn resolve_from(root: &Path, profile: &str, config: &Config) -> Result<Self> {
        validate_profile_name(profile)?;

        let records_base = match &config.access_control_dir {
            Some(dir) => {
                let dir = PathBuf::from(dir);
                if dir.is_absolute() {
                    dir
                } else {
                    root.join(dir)
                }
            }
            None => root.join(ACCESS_CONTROL_DIR),
        };

        Ok(Self {
            root: root.to_path_buf(),
            profile: profile.to_string(),
            records_dir: records_base.join(profile),
        })
    }

    /// Path to the config file under this context's root.
    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Path to the audit log under this context's root.
    pub fn events_path(&self) -> PathBuf {
        self.root.join(EVENTS_FILE)
    }
}

/// Resolve the profgate root directory.
///
/// An explicit path (from `--root`) wins; otherwise `PROFGATE_ROOT`;
/// otherwise `.profgate` under the user's home directory.
pub fn resolve_root(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    if let Ok(root) = env::var(ROOT_ENV_VAR)
        && !root.is_empty()
    {
        return Ok(PathBuf::from(root));
    }

    let home = env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map_err(|_| {
            ProfgateError::UserError(
                "cannot determine home directory; set PROFGATE_ROOT or pass --root".to_string(),
            )
        })?;

    Ok(PathBuf::from(home).join(DEFAULT_ROOT_DIR))
}

/// Validate a profile name for use as a directory component.
///
/// Profile names become filesystem paths, so path separators and relative
/// components are rejected outright.
pub fn validate_profile_name(profile: &str) -> Result<()> {
    if profile.is_empty() {
        return Err(ProfgateError::UserError(
            "profile name must not be empty".to_string(),
        ));
    }

    if profile == "." || profile == ".." {
        return Err(ProfgateError::UserError(format!(
            "invalid profile name '{}'",
            profile
        )));
    }

    if profile.contains('/') || profile.contains('\\') || profile.contains('\0') {
        return Err(ProfgateError::UserError(format!(
            "invalid profile name '{}': must not contain path separators",
            profile
        )));
    }

    Ok(())
}
