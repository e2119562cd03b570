//! Command implementations for profgate.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Every command resolves the profgate root, loads the
//! config, and builds a coordinator backed by the real process table.

use crate::cli::{Cli, ClearArgs, Command, PruneArgs, StatusArgs};
use crate::config::Config;
use crate::context::{ProfileContext, resolve_root};
use crate::coordinator::ProfileAccessCoordinator;
use crate::error::{ProfgateError, Result};
use crate::events::{Event, EventAction, append_event};
use crate::process::SystemInspector;
use serde_json::json;
use std::path::Path;

/// Dispatch a command to its implementation.
pub fn dispatch(cli: Cli) -> Result<()> {
    let root = resolve_root(cli.root.as_deref())?;

    match cli.command {
        Command::Status(args) => cmd_status(&root, args),
        Command::Prune(args) => cmd_prune(&root, args),
        Command::Clear(args) => cmd_clear(&root, args),
    }
}

/// Build a coordinator for `profile` under `root`, returning the context too.
fn coordinator_for(
    root: &Path,
    profile: &str,
) -> Result<(ProfileContext, Config, ProfileAccessCoordinator)> {
    let config = Config::load(root.join(crate::context::CONFIG_FILE))?;
    let ctx = ProfileContext::resolve_from(root, profile, &config)?;
    let coordinator = ProfileAccessCoordinator::new(&ctx, Box::new(SystemInspector::new()))?;
    Ok((ctx, config, coordinator))
}

fn cmd_status(root: &Path, args: StatusArgs) -> Result<()> {
    let (_ctx, _config, coordinator) = coordinator_for(root, &args.profile)?;

    println!("Profile '{}':", args.profile);
    println!(
        "  Locked:  {}",
        if coordinator.is_locked() { "yes" } else { "no" }
    );
    println!(
        "  Active:  {}",
        if coordinator.is_active() { "yes" } else { "no" }
    );

    let records = coordinator.list_records()?;
    if records.is_empty() {
        println!();
        println!("No records.");
        return Ok(());
    }

    println!();
    println!("Records ({}):", records.len());
    println!();

    for record in &records {
        println!("  {} {}:", record.kind.label(), record.pid);
        if let Some(meta) = &record.metadata {
            println!("    Owner:      {}", meta.owner);
            println!("    Command:    {}", meta.command_string());
            println!(
                "    Created:    {}",
                meta.created_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!("    Age:        {}", meta.age_string());
        } else {
            println!("    Metadata:   <unreadable>");
        }
        if record.is_stale {
            println!("    Status:     STALE");
        }
        println!("    Path:       {}", record.path.display());
        println!();
    }

    let stale_count = records.iter().filter(|r| r.is_stale).count();
    if stale_count > 0 {
        println!(
            "Note: {} record(s) are stale. Use `profgate prune {}` to remove stale \
             access records, or `profgate clear {} --force` for orphaned locks.",
            stale_count, args.profile, args.profile
        );
    }

    Ok(())
}

fn cmd_prune(root: &Path, args: PruneArgs) -> Result<()> {
    let (ctx, config, coordinator) = coordinator_for(root, &args.profile)?;

    let pruned = coordinator.prune_stale()?;

    if pruned.is_empty() {
        println!("No stale access records for profile '{}'.", args.profile);
        return Ok(());
    }

    if config.audit_log {
        let event = Event::new(EventAction::StalePrune, &args.profile)
            .with_details(json!({ "pruned_pids": pruned }));
        // Best-effort: a failed append must not fail the prune itself.
        if let Err(e) = append_event(&ctx.events_path(), &event) {
            eprintln!("Warning: failed to log stale_prune event: {}", e);
        }
    }

    println!(
        "Pruned {} stale access record(s) for profile '{}':",
        pruned.len(),
        args.profile
    );
    for pid in pruned {
        println!("  {}", pid);
    }

    Ok(())
}

fn cmd_clear(root: &Path, args: ClearArgs) -> Result<()> {
    // Require --force: clearing a live lock can corrupt whatever the lock
    // holder is doing.
    if !args.force {
        return Err(ProfgateError::UserError(format!(
            "refusing to clear locks without --force flag.\n\n\
             Clearing locks can corrupt an ongoing maintenance operation if the\n\
             lock holder is still running. Only clear locks if you are certain\n\
             the holder has crashed.\n\n\
             To clear the locks, run:\n  profgate clear {} --force",
            args.profile
        )));
    }

    let (ctx, config, coordinator) = coordinator_for(root, &args.profile)?;

    let cleared = coordinator.clear_locks()?;

    if config.audit_log {
        let event = Event::new(EventAction::LocksClear, &args.profile)
            .with_details(json!({ "cleared_pids": cleared, "force": args.force }));
        if let Err(e) = append_event(&ctx.events_path(), &event) {
            eprintln!("Warning: failed to log locks_clear event: {}", e);
        }
    }

    if cleared.is_empty() {
        println!("No lock records to clear for profile '{}'.", args.profile);
    } else {
        println!(
            "Cleared {} lock record(s) for profile '{}':",
            cleared.len(),
            args.profile
        );
        for pid in cleared {
            println!("  {}", pid);
        }
    }

    Ok(())
}
