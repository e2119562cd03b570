//! Error types for profgate.
//!
//! Uses thiserror for derive macros. The two coordination failures —
//! `Locked` and `InUse` — are deliberately separate variants so callers
//! (and exit codes) can distinguish "someone holds the exclusive lock"
//! from "someone is actively using the profile".

use crate::exit_codes;
use thiserror::Error;

/// Main error type for profgate operations.
#[derive(Error, Debug)]
pub enum ProfgateError {
    /// User provided invalid arguments or an IO operation failed.
    #[error("{0}")]
    UserError(String),

    /// Another process holds (or is acquiring) the exclusive lock on the
    /// profile, so it cannot be accessed or locked right now.
    #[error("profile '{profile}' is locked by process(es) {}", format_pids(.pids))]
    Locked { profile: String, pids: Vec<u32> },

    /// Other processes hold access records on the profile, so it cannot be
    /// locked for exclusive use. Each blocker is rendered as `PID (command)`.
    #[error("profile '{profile}' is in use by {}", .blockers.join(", "))]
    InUse {
        profile: String,
        blockers: Vec<String>,
    },
}

impl ProfgateError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ProfgateError::UserError(_) => exit_codes::USER_ERROR,
            ProfgateError::Locked { .. } => exit_codes::PROFILE_LOCKED,
            ProfgateError::InUse { .. } => exit_codes::PROFILE_IN_USE,
        }
    }
}

fn format_pids(pids: &[u32]) -> String {
    let rendered: Vec<String> = pids.iter().map(|pid| pid.to_string()).collect();
    rendered.join(", ")
}

/// Result type alias for profgate operations.
pub type Result<T> = std::result::Result<T, ProfgateError>;
