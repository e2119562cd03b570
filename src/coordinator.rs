//! Profile access coordination.
//!
//! This module implements the mutual-exclusion protocol between independent
//! OS processes sharing a profile:
//! - Access records (`<pid>.pid`) register non-exclusive use
//! - Lock records (`<pid>.lock`) claim exclusive use
//!
//! # Protocol
//!
//! `request_access` publishes an access record (write-to-temp + atomic
//! rename) after verifying no live lock record exists, then re-checks and
//! rolls its record back if a lock appeared in the window. `lock` verifies no
//! live lock or access records exist (reaping stale access records along the
//! way), creates its lock record with **create_new** (exclusive create)
//! semantics, then re-checks both conditions and rolls back on a detected
//! race.
//!
//! The double-check narrows but does not close every window: two processes
//! interleaving precisely around the re-checks can still transiently both
//! consider themselves sole owner. Exclusive creation makes the
//! lock-vs-lock collision on a single filesystem atomic; the access-vs-lock
//! window remains an accepted trade-off of the filesystem-marker approach.
//! Callers needing retry or backoff implement it above this layer.
//!
//! # Record Lifecycle
//!
//! There is no `release_access`: an access record stands for the whole life
//! of its process and is reaped by a later locker's stale scan (or `prune`)
//! once the process is gone. Lock records are managed through RAII guard
//! objects that remove the lock file when dropped, on all exit paths. A lock
//! file orphaned by an unmaskable kill is recovered via `clear_locks`.

use crate::context::ProfileContext;
use crate::error::{ProfgateError, Result};
use crate::fs::atomic_write_file;
use crate::process::{ProcessInspector, own_cmdline};
use crate::records::{
    RecordInfo, RecordKind, RecordMetadata, parse_record_filename, record_path,
};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Coordinates shared and exclusive access to one profile's resources.
///
/// Each instance identifies itself by the current process's pid and command
/// line, captured at construction. The inspector is injected so tests can
/// script the process table.
pub struct ProfileAccessCoordinator {
    profile: String,
    records_dir: PathBuf,
    pid: u32,
    cmdline: Vec<String>,
    inspector: Box<dyn ProcessInspector>,
}

impl ProfileAccessCoordinator {
    /// Create a coordinator for the profile described by `ctx`.
    ///
    /// Creates the record directory if absent and captures the current
    /// process's identity for all later record writes and staleness checks.
    pub fn new(ctx: &ProfileContext, inspector: Box<dyn ProcessInspector>) -> Result<Self> {
        fs::create_dir_all(&ctx.records_dir).map_err(|e| {
            ProfgateError::UserError(format!(
                "failed to create record directory '{}': {}",
                ctx.records_dir.display(),
                e
            ))
        })?;

        let pid = std::process::id();
        let cmdline = inspector
            .cmdline(pid)
            .filter(|cmd| !cmd.is_empty())
            .unwrap_or_else(own_cmdline);

        Ok(Self {
            profile: ctx.profile.clone(),
            records_dir: ctx.records_dir.clone(),
            pid,
            cmdline,
            inspector,
        })
    }

    /// The profile this coordinator manages.
    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// The record directory this coordinator scans.
    pub fn records_dir(&self) -> &Path {
        &self.records_dir
    }

    /// Register the current process as an active user of the profile.
    ///
    /// Fails with [`ProfgateError::Locked`] if another process holds (or is
    /// acquiring) the exclusive lock — including when the lock appears in the
    /// window right after our record is published, in which case the record
    /// is rolled back before the error propagates.
    ///
    /// There is no corresponding release: the record stands until this
    /// process exits and a later locker reaps it.
    pub fn request_access(&self) -> Result<()> {
        self.raise_if_locked()?;

        let meta = RecordMetadata::new(self.pid, self.cmdline.clone());
        let access_path = record_path(&self.records_dir, self.pid, RecordKind::Access);
        atomic_write_file(&access_path, &meta.to_json()?)?;

        // A locker may have passed its own checks while our record was still
        // in flight. Roll back so a phantom record does not outlive the error.
        if let Err(err) = self.raise_if_locked() {
            tolerant_remove(&access_path)?;
            return Err(err);
        }

        Ok(())
    }

    /// Acquire the exclusive lock on the profile.
    ///
    /// Stale access records (owner dead, or pid recycled to an unrelated
    /// command) are reaped first; live ones fail the call with
    /// [`ProfgateError::InUse`]. A live foreign lock record fails it with
    /// [`ProfgateError::Locked`]. On success the returned guard owns the lock
    /// file and removes it when dropped.
    pub fn lock(&self) -> Result<LockGuard> {
        self.raise_if_locked()?;

        self.prune_stale()?;
        let blockers = self.live_records(RecordKind::Access)?;
        if !blockers.is_empty() {
            return Err(self.in_use_error(&blockers));
        }

        let guard = self.create_lock_record()?;

        // Re-check both conditions now that our claim is visible. On either
        // race the just-created lock file is rolled back via the guard.
        if let Err(err) = self.raise_if_locked() {
            guard.release()?;
            return Err(err);
        }
        let blockers = self.live_records(RecordKind::Access)?;
        if !blockers.is_empty() {
            guard.release()?;
            return Err(self.in_use_error(&blockers));
        }

        Ok(guard)
    }

    /// Whether any lock record exists for the profile.
    ///
    /// Pure existence check: stale lock records count too. Use `status` (or
    /// [`Self::list_records`]) to tell them apart.
    pub fn is_locked(&self) -> bool {
        self.scan(RecordKind::Lock)
            .map(|records| !records.is_empty())
            .unwrap_or(false)
    }

    /// Whether any access record exists for the profile.
    ///
    /// Same staleness caveat as [`Self::is_locked`].
    pub fn is_active(&self) -> bool {
        self.scan(RecordKind::Access)
            .map(|records| !records.is_empty())
            .unwrap_or(false)
    }

    /// Unconditionally delete every lock record for the profile.
    ///
    /// Administrative escape hatch for lock files orphaned by a process that
    /// died without running its guard (e.g. SIGKILL). Returns the pids whose
    /// lock records were removed.
    pub fn clear_locks(&self) -> Result<Vec<u32>> {
        let mut cleared = Vec::new();
        for (pid, path) in self.scan(RecordKind::Lock)? {
            tolerant_remove(&path)?;
            cleared.push(pid);
        }
        Ok(cleared)
    }

    /// Remove stale access records and return the reaped pids.
    ///
    /// A record is stale when its process is gone, or when the pid is now
    /// running a different command (recycled by the OS). Records owned by the
    /// current process are never considered stale.
    pub fn prune_stale(&self) -> Result<Vec<u32>> {
        let mut pruned = Vec::new();
        for (pid, path) in self.scan(RecordKind::Access)? {
            if self.is_record_stale(pid, &path) {
                tolerant_remove(&path)?;
                pruned.push(pid);
            }
        }
        Ok(pruned)
    }

    /// List every record in the profile directory with its staleness verdict.
    pub fn list_records(&self) -> Result<Vec<RecordInfo>> {
        let mut records = Vec::new();

        for kind in [RecordKind::Access, RecordKind::Lock] {
            for (pid, path) in self.scan(kind)? {
                let metadata = RecordMetadata::from_file(&path).ok();
                let is_stale = self.is_record_stale(pid, &path);
                records.push(RecordInfo {
                    path,
                    pid,
                    kind,
                    metadata,
                    is_stale,
                });
            }
        }

        records.sort_by_key(|record| record.pid);
        Ok(records)
    }

    /// Fail with `Locked` if another process holds a non-stale lock record.
    fn raise_if_locked(&self) -> Result<()> {
        let lockers = self.live_records(RecordKind::Lock)?;
        if lockers.is_empty() {
            return Ok(());
        }

        Err(ProfgateError::Locked {
            profile: self.profile.clone(),
            pids: lockers.into_iter().map(|(pid, _)| pid).collect(),
        })
    }

    /// Create this process's lock record with exclusive-create semantics.
    ///
    /// The path embeds our pid, so a collision means either a leftover record
    /// from a previous occupant of this pid or a second `lock()` while a
    /// guard is live; both surface as `Locked`.
    fn create_lock_record(&self) -> Result<LockGuard> {
        let lock_path = record_path(&self.records_dir, self.pid, RecordKind::Lock);
        let meta = RecordMetadata::new(self.pid, self.cmdline.clone());

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::AlreadyExists {
                    ProfgateError::Locked {
                        profile: self.profile.clone(),
                        pids: vec![self.pid],
                    }
                } else {
                    ProfgateError::UserError(format!(
                        "failed to create lock record '{}': {}",
                        lock_path.display(),
                        e
                    ))
                }
            })?;

        let json = meta.to_json()?;
        file.write_all(json.as_bytes()).map_err(|e| {
            let _ = fs::remove_file(&lock_path);
            ProfgateError::UserError(format!("failed to write lock record: {}", e))
        })?;

        file.sync_all().map_err(|e| {
            let _ = fs::remove_file(&lock_path);
            ProfgateError::UserError(format!("failed to sync lock record: {}", e))
        })?;

        Ok(LockGuard::new(lock_path))
    }

    /// All records of `kind` in the profile directory, as `(pid, path)`.
    ///
    /// A missing directory reads as empty: the profile simply has no records.
    fn scan(&self, kind: RecordKind) -> Result<Vec<(u32, PathBuf)>> {
        let entries = match fs::read_dir(&self.records_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(ProfgateError::UserError(format!(
                    "failed to read record directory '{}': {}",
                    self.records_dir.display(),
                    e
                )));
            }
        };

        let mut records = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                ProfgateError::UserError(format!("failed to read record directory entry: {}", e))
            })?;

            let path = entry.path();
            if let Some((pid, entry_kind)) = parse_record_filename(&path)
                && entry_kind == kind
            {
                records.push((pid, path));
            }
        }

        Ok(records)
    }

    /// Records of `kind` owned by other processes that are not stale.
    fn live_records(&self, kind: RecordKind) -> Result<Vec<(u32, PathBuf)>> {
        Ok(self
            .scan(kind)?
            .into_iter()
            .filter(|(pid, _)| *pid != self.pid)
            .filter(|(pid, path)| !self.is_record_stale(*pid, path))
            .collect())
    }

    /// Staleness verdict for one record.
    ///
    /// Dead pid: stale. Live pid whose command line differs from the recorded
    /// one: stale (the OS recycled the pid). Live pid with matching command,
    /// or whose identity cannot be established (unreadable record, empty live
    /// command line): treated as live, so nothing gets reaped on uncertainty.
    fn is_record_stale(&self, pid: u32, path: &Path) -> bool {
        if pid == self.pid {
            return false;
        }

        let Some(live_cmd) = self.inspector.cmdline(pid) else {
            return true;
        };

        match RecordMetadata::from_file(path) {
            Ok(meta) => !live_cmd.is_empty() && live_cmd != meta.cmd,
            Err(_) => false,
        }
    }

    /// Build the `InUse` error from blocking access records.
    fn in_use_error(&self, blockers: &[(u32, PathBuf)]) -> ProfgateError {
        let rendered = blockers
            .iter()
            .map(|(pid, path)| match RecordMetadata::from_file(path) {
                Ok(meta) => format!("{} ({})", pid, meta.command_string()),
                Err(_) => format!("{} (<unknown>)", pid),
            })
            .collect();

        ProfgateError::InUse {
            profile: self.profile.clone(),
            blockers: rendered,
        }
    }
}

/// RAII guard for a held profile lock.
///
/// When dropped, the lock record is deleted. A record that already vanished
/// is fine (deletion is idempotent); any other deletion failure prints a
/// warning rather than panicking.
#[derive(Debug)]
pub struct LockGuard {
    path: PathBuf,
    released: bool,
}

impl LockGuard {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            released: false,
        }
    }

    /// Path of the lock record this guard owns.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the lock explicitly, surfacing any deletion error.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        tolerant_remove(&self.path)
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if !self.released
            && let Err(e) = tolerant_remove(&self.path)
        {
            eprintln!("Warning: failed to release lock '{}': {}", self.path.display(), e);
        }
    }
}

/// Delete a record file, treating an already-absent file as success.
fn tolerant_remove(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ProfgateError::UserError(format!(
            "failed to remove record '{}': {}",
            path.display(),
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::test_support::FakeInspector;
    use std::panic::AssertUnwindSafe;
    use tempfile::TempDir;

    fn coordinator(temp_dir: &TempDir, inspector: FakeInspector) -> ProfileAccessCoordinator {
        let ctx = ProfileContext::resolve_from(temp_dir.path(), "demo", &Config::default())
            .unwrap();
        ProfileAccessCoordinator::new(&ctx, Box::new(inspector)).unwrap()
    }

    /// Write a record file for a (possibly fictional) foreign process.
    fn plant_record(coord: &ProfileAccessCoordinator, pid: u32, cmd: &[&str], kind: RecordKind) {
        let meta = RecordMetadata::new(pid, cmd.iter().map(|s| s.to_string()).collect());
        let path = record_path(coord.records_dir(), pid, kind);
        fs::write(&path, meta.to_json().unwrap()).unwrap();
    }

    #[test]
    fn request_access_registers_a_record() {
        let temp_dir = TempDir::new().unwrap();
        let coord = coordinator(&temp_dir, FakeInspector::new());

        coord.request_access().unwrap();

        assert_eq!(coord.profile(), "demo");
        let path = record_path(coord.records_dir(), std::process::id(), RecordKind::Access);
        assert!(path.exists());
        let meta = RecordMetadata::from_file(&path).unwrap();
        assert_eq!(meta.pid, std::process::id());
        assert!(coord.is_active());
    }

    #[test]
    fn request_access_is_idempotent_for_one_process() {
        let temp_dir = TempDir::new().unwrap();
        let coord = coordinator(&temp_dir, FakeInspector::new());

        coord.request_access().unwrap();
        coord.request_access().unwrap();

        let records = coord.list_records().unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn request_access_fails_when_profile_is_locked() {
        let temp_dir = TempDir::new().unwrap();
        let inspector = FakeInspector::new().with_process(9001, &["profgated", "maintain"]);
        let coord = coordinator(&temp_dir, inspector);
        plant_record(&coord, 9001, &["profgated", "maintain"], RecordKind::Lock);

        let err = coord.request_access().unwrap_err();

        assert!(matches!(err, ProfgateError::Locked { .. }));
        assert!(err.to_string().contains("9001"));
        // No access record may linger after the failure.
        let path = record_path(coord.records_dir(), std::process::id(), RecordKind::Access);
        assert!(!path.exists());
    }

    #[test]
    fn request_access_ignores_stale_lock_records() {
        let temp_dir = TempDir::new().unwrap();
        // Pid 9001 is not in the fake process table: the lock is orphaned.
        let coord = coordinator(&temp_dir, FakeInspector::new());
        plant_record(&coord, 9001, &["profgated", "maintain"], RecordKind::Lock);

        coord.request_access().unwrap();
        assert!(coord.is_active());
    }

    #[test]
    fn lock_succeeds_on_an_idle_profile() {
        let temp_dir = TempDir::new().unwrap();
        let coord = coordinator(&temp_dir, FakeInspector::new());

        let guard = coord.lock().unwrap();

        assert!(coord.is_locked());
        assert!(guard.path().exists());

        drop(guard);
        assert!(!coord.is_locked());

        // With the previous lock released, the next acquisition succeeds.
        let guard = coord.lock().unwrap();
        drop(guard);
    }

    #[test]
    fn lock_fails_while_profile_is_in_use() {
        let temp_dir = TempDir::new().unwrap();
        let inspector = FakeInspector::new().with_process(4242, &["python", "run_job.py"]);
        let coord = coordinator(&temp_dir, inspector);
        plant_record(&coord, 4242, &["python", "run_job.py"], RecordKind::Access);

        let err = coord.lock().unwrap_err();

        assert!(matches!(err, ProfgateError::InUse { .. }));
        assert!(err.to_string().contains("4242"));
        assert!(err.to_string().contains("python run_job.py"));
        // The failed attempt must not leave a lock record behind.
        assert!(!coord.is_locked());
        // The blocking access record is untouched.
        assert!(record_path(coord.records_dir(), 4242, RecordKind::Access).exists());
    }

    #[test]
    fn lock_fails_while_another_process_holds_the_lock() {
        let temp_dir = TempDir::new().unwrap();
        let inspector = FakeInspector::new().with_process(9001, &["profgated", "maintain"]);
        let coord = coordinator(&temp_dir, inspector);
        plant_record(&coord, 9001, &["profgated", "maintain"], RecordKind::Lock);

        let err = coord.lock().unwrap_err();

        assert!(matches!(err, ProfgateError::Locked { .. }));
        // The foreign lock record is not modified by the failed attempt.
        let foreign = record_path(coord.records_dir(), 9001, RecordKind::Lock);
        assert!(foreign.exists());
        let meta = RecordMetadata::from_file(&foreign).unwrap();
        assert_eq!(meta.pid, 9001);
    }

    #[test]
    fn lock_reaps_stale_access_records() {
        let temp_dir = TempDir::new().unwrap();
        // 4242 is dead; 4343 is alive but running an unrelated command.
        let inspector = FakeInspector::new().with_process(4343, &["bash"]);
        let coord = coordinator(&temp_dir, inspector);
        plant_record(&coord, 4242, &["python", "run_job.py"], RecordKind::Access);
        plant_record(&coord, 4343, &["python", "run_job.py"], RecordKind::Access);

        let guard = coord.lock().unwrap();

        assert!(!record_path(coord.records_dir(), 4242, RecordKind::Access).exists());
        assert!(!record_path(coord.records_dir(), 4343, RecordKind::Access).exists());
        drop(guard);
    }

    #[test]
    fn lock_is_not_reentrant() {
        let temp_dir = TempDir::new().unwrap();
        let coord = coordinator(&temp_dir, FakeInspector::new());

        let _guard = coord.lock().unwrap();
        let err = coord.lock().unwrap_err();

        assert!(matches!(err, ProfgateError::Locked { .. }));
        assert!(err.to_string().contains(&std::process::id().to_string()));
    }

    #[test]
    fn lock_guard_releases_on_panic() {
        let temp_dir = TempDir::new().unwrap();
        let coord = coordinator(&temp_dir, FakeInspector::new());
        let lock_path = record_path(coord.records_dir(), std::process::id(), RecordKind::Lock);

        let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = coord.lock().unwrap();
            panic!("maintenance failed");
        }));

        assert!(result.is_err());
        assert!(!lock_path.exists());
        assert!(!coord.is_locked());
    }

    #[test]
    fn lock_guard_explicit_release() {
        let temp_dir = TempDir::new().unwrap();
        let coord = coordinator(&temp_dir, FakeInspector::new());

        let guard = coord.lock().unwrap();
        guard.release().unwrap();

        assert!(!coord.is_locked());
    }

    #[test]
    fn lock_guard_release_tolerates_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let coord = coordinator(&temp_dir, FakeInspector::new());

        let guard = coord.lock().unwrap();
        fs::remove_file(guard.path()).unwrap();

        // Someone swept the record already: release is still a success.
        guard.release().unwrap();
    }

    #[test]
    fn clear_locks_removes_every_lock_record() {
        let temp_dir = TempDir::new().unwrap();
        let inspector = FakeInspector::new().with_process(9001, &["profgated", "maintain"]);
        let coord = coordinator(&temp_dir, inspector);
        plant_record(&coord, 9001, &["profgated", "maintain"], RecordKind::Lock);
        plant_record(&coord, 9002, &["profgated", "maintain"], RecordKind::Lock);

        let mut cleared = coord.clear_locks().unwrap();
        cleared.sort_unstable();

        assert_eq!(cleared, vec![9001, 9002]);
        assert!(!coord.is_locked());

        // With the orphaned locks gone, locking works again.
        let guard = coord.lock().unwrap();
        drop(guard);
    }

    #[test]
    fn prune_reports_reaped_pids() {
        let temp_dir = TempDir::new().unwrap();
        let inspector = FakeInspector::new().with_process(4242, &["python", "run_job.py"]);
        let coord = coordinator(&temp_dir, inspector);
        plant_record(&coord, 4242, &["python", "run_job.py"], RecordKind::Access);
        plant_record(&coord, 5555, &["python", "other.py"], RecordKind::Access);

        let pruned = coord.prune_stale().unwrap();

        assert_eq!(pruned, vec![5555]);
        assert!(record_path(coord.records_dir(), 4242, RecordKind::Access).exists());
    }

    #[test]
    fn prune_never_reaps_own_record() {
        let temp_dir = TempDir::new().unwrap();
        let coord = coordinator(&temp_dir, FakeInspector::new());

        coord.request_access().unwrap();
        let pruned = coord.prune_stale().unwrap();

        assert!(pruned.is_empty());
        assert!(coord.is_active());
    }

    // The three staleness verdicts for a record with pid 4242 running
    // `python run_job.py`.

    #[test]
    fn record_with_matching_live_command_is_not_stale() {
        let temp_dir = TempDir::new().unwrap();
        let inspector = FakeInspector::new().with_process(4242, &["python", "run_job.py"]);
        let coord = coordinator(&temp_dir, inspector);
        plant_record(&coord, 4242, &["python", "run_job.py"], RecordKind::Access);

        assert!(coord.prune_stale().unwrap().is_empty());
    }

    #[test]
    fn record_with_recycled_pid_is_stale() {
        let temp_dir = TempDir::new().unwrap();
        let inspector = FakeInspector::new().with_process(4242, &["bash"]);
        let coord = coordinator(&temp_dir, inspector);
        plant_record(&coord, 4242, &["python", "run_job.py"], RecordKind::Access);

        assert_eq!(coord.prune_stale().unwrap(), vec![4242]);
    }

    #[test]
    fn record_with_dead_pid_is_stale() {
        let temp_dir = TempDir::new().unwrap();
        let coord = coordinator(&temp_dir, FakeInspector::new());
        plant_record(&coord, 4242, &["python", "run_job.py"], RecordKind::Access);

        assert_eq!(coord.prune_stale().unwrap(), vec![4242]);
    }

    #[test]
    fn list_records_reports_kind_and_staleness() {
        let temp_dir = TempDir::new().unwrap();
        let inspector = FakeInspector::new().with_process(4242, &["python", "run_job.py"]);
        let coord = coordinator(&temp_dir, inspector);
        plant_record(&coord, 4242, &["python", "run_job.py"], RecordKind::Access);
        plant_record(&coord, 9001, &["profgated", "maintain"], RecordKind::Lock);

        let records = coord.list_records().unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].pid, 4242);
        assert_eq!(records[0].kind, RecordKind::Access);
        assert!(!records[0].is_stale);
        assert_eq!(records[1].pid, 9001);
        assert_eq!(records[1].kind, RecordKind::Lock);
        assert!(records[1].is_stale);
    }

    #[test]
    fn scan_ignores_foreign_files() {
        let temp_dir = TempDir::new().unwrap();
        let coord = coordinator(&temp_dir, FakeInspector::new());
        fs::write(coord.records_dir().join("events.ndjson"), "{}\n").unwrap();
        fs::write(coord.records_dir().join("README"), "notes").unwrap();

        assert!(!coord.is_active());
        assert!(!coord.is_locked());
        assert!(coord.list_records().unwrap().is_empty());
    }

    #[test]
    fn end_to_end_demo_scenario() {
        let temp_dir = TempDir::new().unwrap();

        // Process X (4242) is live and has requested access.
        let inspector = FakeInspector::new().with_process(4242, &["python", "run_job.py"]);
        let coord = coordinator(&temp_dir, inspector);
        plant_record(&coord, 4242, &["python", "run_job.py"], RecordKind::Access);

        // Process Y cannot lock while X is active; no lock file is created.
        let err = coord.lock().unwrap_err();
        assert!(matches!(err, ProfgateError::InUse { .. }));
        assert!(err.to_string().contains("4242"));
        assert!(!coord.is_locked());

        // X terminates (record removed, as its own exit would leave it for
        // the stale scan; here we drop it directly).
        fs::remove_file(record_path(coord.records_dir(), 4242, RecordKind::Access)).unwrap();

        // Y can now lock; release leaves the profile unlocked.
        let guard = coord.lock().unwrap();
        assert!(coord.is_locked());
        drop(guard);
        assert!(!coord.is_locked());
    }
}
