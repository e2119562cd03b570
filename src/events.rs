//! Audit logging for administrative actions.
//!
//! Commands that mutate coordination state by hand (clearing locks, pruning
//! stale records) append single-line JSON events to `events.ndjson` at the
//! profgate root, so an operator can reconstruct who intervened and when.
//!
//! # Event Format
//!
//! Each event is a JSON object with the following fields:
//! - `ts`: RFC3339 timestamp
//! - `action`: the action performed (`locks_clear` / `stale_prune`)
//! - `actor`: the owner string (e.g., `user@HOST`)
//! - `profile`: the profile the action targeted
//! - `details`: freeform object with action-specific details
//!
//! Appending is best-effort at call sites: a failed append must never turn a
//! successful administrative action into an error.

use crate::error::{ProfgateError, Result};
use crate::records::owner_string;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Actions that can be logged as events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// Lock records cleared via the administrative escape hatch.
    LocksClear,
    /// Stale access records pruned.
    StalePrune,
}

/// An event record for the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// RFC3339 timestamp when the event occurred.
    pub ts: DateTime<Utc>,

    /// The action that was performed.
    pub action: EventAction,

    /// The actor who performed the action (e.g., `user@HOST`).
    pub actor: String,

    /// The profile the action targeted.
    pub profile: String,

    /// Action-specific details.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub details: Value,
}

impl Event {
    /// Create an event for `action` on `profile`, stamped now.
    pub fn new(action: EventAction, profile: &str) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: owner_string(),
            profile: profile.to_string(),
            details: Value::Null,
        }
    }

    /// Attach action-specific details.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }
}

/// Append an event to the audit log at `path` as one NDJSON line.
pub fn append_event(path: &Path, event: &Event) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            ProfgateError::UserError(format!(
                "failed to create events directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let line = serde_json::to_string(event)
        .map_err(|e| ProfgateError::UserError(format!("failed to serialize event: {}", e)))?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            ProfgateError::UserError(format!(
                "failed to open events file '{}': {}",
                path.display(),
                e
            ))
        })?;

    writeln!(file, "{}", line)
        .map_err(|e| ProfgateError::UserError(format!("failed to append event: {}", e)))
}
