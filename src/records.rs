//! Record model for profile coordination.
//!
//! A profile's record directory contains two kinds of marker files:
//! - `<pid>.pid` — an access record: the process is using the profile
//!   non-exclusively
//! - `<pid>.lock` — a lock record: the process holds (or is acquiring) the
//!   exclusive lock
//!
//! Both kinds carry the same JSON metadata payload:
//! - `pid`: the owning process id (also encoded in the filename)
//! - `owner`: the owner string (e.g., `user@HOST`)
//! - `cmd`: the owning process's command line at record creation
//! - `created_at`: RFC3339 timestamp
//!
//! `pid` and `cmd` are load-bearing: together they let a later process decide
//! whether the record is stale (owner dead, or the pid recycled by the OS for
//! an unrelated command). `owner` and `created_at` exist for diagnostics.

use crate::error::{ProfgateError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Kind of coordination record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Non-exclusive use of the profile.
    Access,
    /// Exclusive lock on the profile.
    Lock,
}

impl RecordKind {
    /// File extension for this record kind.
    pub fn extension(&self) -> &'static str {
        match self {
            RecordKind::Access => "pid",
            RecordKind::Lock => "lock",
        }
    }

    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::Access => "access",
            RecordKind::Lock => "lock",
        }
    }

    /// Map a file extension back to a record kind.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "pid" => Some(RecordKind::Access),
            "lock" => Some(RecordKind::Lock),
            _ => None,
        }
    }
}

/// Metadata stored inside record files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Process id of the record owner.
    pub pid: u32,

    /// Owner of the record (e.g., `user@HOST`).
    pub owner: String,

    /// Command line of the owning process when the record was written.
    pub cmd: Vec<String>,

    /// Timestamp when the record was created (RFC3339).
    pub created_at: DateTime<Utc>,
}

impl RecordMetadata {
    /// Create metadata for the given process.
    pub fn new(pid: u32, cmd: Vec<String>) -> Self {
        Self {
            pid,
            owner: owner_string(),
            cmd,
            created_at: Utc::now(),
        }
    }

    /// Parse record metadata from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            ProfgateError::UserError(format!(
                "failed to read record file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            ProfgateError::UserError(format!(
                "failed to parse record file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })
    }

    /// Serialize record metadata to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ProfgateError::UserError(format!("failed to serialize record: {}", e)))
    }

    /// Calculate the age of the record.
    pub fn age(&self) -> Duration {
        Utc::now().signed_duration_since(self.created_at)
    }

    /// Format the age as a human-readable string.
    pub fn age_string(&self) -> String {
        let age = self.age();
        let minutes = age.num_minutes();
        let hours = age.num_hours();
        let days = age.num_days();

        if days > 0 {
            format!("{}d {}h", days, hours % 24)
        } else if hours > 0 {
            format!("{}h {}m", hours, minutes % 60)
        } else {
            format!("{}m", minutes)
        }
    }

    /// Render the recorded command line for display.
    pub fn command_string(&self) -> String {
        if self.cmd.is_empty() {
            "<unknown>".to_string()
        } else {
            self.cmd.join(" ")
        }
    }
}

/// Information about one record in a profile's directory.
#[derive(Debug, Clone)]
pub struct RecordInfo {
    /// The record file path.
    pub path: PathBuf,

    /// The owning process id, parsed from the filename.
    pub pid: u32,

    /// The record kind.
    pub kind: RecordKind,

    /// The record metadata, when the file content was readable.
    pub metadata: Option<RecordMetadata>,

    /// Whether the record is stale (owner dead or pid recycled).
    pub is_stale: bool,
}

impl std::fmt::Display for RecordInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.metadata {
            Some(meta) => write!(
                f,
                "{} {} (owner: {}, cmd: {}, age: {}{})",
                self.kind.label(),
                self.pid,
                meta.owner,
                meta.command_string(),
                meta.age_string(),
                if self.is_stale { ", STALE" } else { "" }
            ),
            None => write!(
                f,
                "{} {} (unreadable metadata{})",
                self.kind.label(),
                self.pid,
                if self.is_stale { ", STALE" } else { "" }
            ),
        }
    }
}

/// Parse a record filename into its pid and kind.
///
/// Returns `None` for anything that is not a `<pid>.pid` / `<pid>.lock`
/// file, so scans skip temp files and the audit log.
pub fn parse_record_filename(path: &Path) -> Option<(u32, RecordKind)> {
    let kind = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(RecordKind::from_extension)?;

    let stem = path.file_stem().and_then(|s| s.to_str())?;
    // Hidden temp files (`.4242.pid.tmp`) never reach here thanks to the
    // extension filter, but a plain non-numeric stem still must not parse.
    let pid = stem.parse::<u32>().ok()?;

    Some((pid, kind))
}

/// Record file path for a pid of the given kind inside `dir`.
pub fn record_path(dir: &Path, pid: u32, kind: RecordKind) -> PathBuf {
    dir.join(format!("{}.{}", pid, kind.extension()))
}

/// Get the owner string for record metadata and audit events.
pub(crate) fn owner_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}
