//! Atomic file publication for profgate.
//!
//! Access records are how other processes learn that a profile is in use, so
//! a record must never be observable in a half-written state. All record
//! writes follow the same pattern:
//!
//! 1. Write content to a temporary file in the same directory
//! 2. Sync the file to disk (fsync)
//! 3. Rename it over the target path
//!
//! On POSIX, `rename()` is atomic when source and destination are on the same
//! filesystem, which holds here since the temp file lives next to the target.
//! On crash, a temporary file (named `.{filename}.tmp`) may remain; scans
//! ignore it because only `.pid`/`.lock` extensions are considered.

use crate::error::{ProfgateError, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Atomically write a string to a file.
///
/// The target file is either absent, its previous content, or the new
/// content — never a partial write.
pub fn atomic_write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            ProfgateError::UserError(format!(
                "failed to create directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let temp_path = temp_path_for(path)?;
    write_and_sync(&temp_path, content.as_bytes())?;
    rename_into_place(&temp_path, path)
}

/// Temporary sibling path for the target: `.{filename}.tmp`.
fn temp_path_for(target: &Path) -> Result<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ProfgateError::UserError("invalid file path".to_string()))?;

    Ok(parent.join(format!(".{}.tmp", filename)))
}

fn write_and_sync(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| {
        ProfgateError::UserError(format!(
            "failed to create temporary file '{}': {}",
            path.display(),
            e
        ))
    })?;

    file.write_all(content).map_err(|e| {
        let _ = fs::remove_file(path);
        ProfgateError::UserError(format!("failed to write temporary file: {}", e))
    })?;

    file.sync_all().map_err(|e| {
        let _ = fs::remove_file(path);
        ProfgateError::UserError(format!("failed to sync temporary file to disk: {}", e))
    })?;

    Ok(())
}

fn rename_into_place(source: &Path, target: &Path) -> Result<()> {
    match fs::rename(source, target) {
        Ok(()) => Ok(()),
        // Windows refuses to rename over an existing file. Record files are
        // per-pid and only ever replaced by their own process, so removing
        // the old record first is safe there.
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            let _ = fs::remove_file(target);
            fs::rename(source, target).map_err(|e| {
                let _ = fs::remove_file(source);
                ProfgateError::UserError(format!(
                    "failed to replace '{}': {}",
                    target.display(),
                    e
                ))
            })
        }
        Err(e) => {
            let _ = fs::remove_file(source);
            Err(ProfgateError::UserError(format!(
                "failed to replace '{}': {}",
                target.display(),
                e
            )))
        }
    }
}
