//! Process-table introspection for staleness checks.
//!
//! Coordination records name their owning process by pid, but pids are
//! recycled by the OS: a record's pid being alive does not prove the original
//! owner is. Staleness decisions therefore need both liveness and the live
//! process's command line, compared against the command line stored in the
//! record.
//!
//! The lookup is expressed as the `ProcessInspector` trait so the coordinator
//! can be driven by a scripted process table in tests instead of the real one.

use std::sync::Mutex;
use sysinfo::{Pid, ProcessesToUpdate, System};

/// Capability to query the OS process table.
pub trait ProcessInspector {
    /// Command line of the process with `pid`, or `None` if no such process
    /// is currently running.
    ///
    /// A running process whose command line cannot be read yields
    /// `Some(vec![])`; callers treat that as "alive, identity unknown".
    fn cmdline(&self, pid: u32) -> Option<Vec<String>>;

    /// Whether a process with `pid` is currently running.
    fn is_running(&self, pid: u32) -> bool {
        self.cmdline(pid).is_some()
    }
}

/// Inspector backed by the real OS process table.
pub struct SystemInspector {
    system: Mutex<System>,
}

impl SystemInspector {
    /// Create an inspector with an empty process snapshot.
    ///
    /// Processes are refreshed per query, so construction is cheap.
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for SystemInspector {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessInspector for SystemInspector {
    fn cmdline(&self, pid: u32) -> Option<Vec<String>> {
        let mut system = self
            .system
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());

        let pid = Pid::from_u32(pid);
        // Refresh only the queried process; `true` drops it from the
        // snapshot again if it has exited.
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);

        system.process(pid).map(|process| {
            process
                .cmd()
                .iter()
                .map(|arg| arg.to_string_lossy().into_owned())
                .collect()
        })
    }
}

/// Command line of the current process.
///
/// Used as the fallback identity when the inspector cannot see the current
/// process (restricted /proc, exotic platforms).
pub fn own_cmdline() -> Vec<String> {
    std::env::args().collect()
}
