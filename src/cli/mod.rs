//! CLI argument parsing for profgate.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Profgate: file-based access coordination for shared application profiles.
///
/// Processes sharing a profile register themselves through access records;
/// maintenance takes an exclusive lock. Both are plain marker files under the
/// profgate root, so coordination needs no daemon and no network.
#[derive(Parser, Debug)]
#[command(name = "profgate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Override the profgate root directory (default: PROFGATE_ROOT or
    /// ~/.profgate).
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for profgate.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show coordination state for a profile.
    ///
    /// Reports whether the profile is locked or in active use, then lists
    /// every access and lock record with owner, command, age, and staleness.
    Status(StatusArgs),

    /// Remove stale access records for a profile.
    ///
    /// A record is stale when its process is gone or its pid now belongs to
    /// an unrelated command. Live records are never touched.
    Prune(PruneArgs),

    /// Clear all lock records for a profile.
    ///
    /// Escape hatch for lock files orphaned by a crashed maintenance
    /// process. Requires --force to prevent accidental clearing.
    Clear(ClearArgs),
}

/// Arguments for the `status` command.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Profile to inspect.
    pub profile: String,
}

/// Arguments for the `prune` command.
#[derive(Parser, Debug)]
pub struct PruneArgs {
    /// Profile whose stale access records should be removed.
    pub profile: String,
}

/// Arguments for the `clear` command.
#[derive(Parser, Debug)]
pub struct ClearArgs {
    /// Profile whose lock records should be cleared.
    pub profile: String,

    /// Force clearing the locks (required for safety).
    #[arg(long)]
    pub force: bool,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
