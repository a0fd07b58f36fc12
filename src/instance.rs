//! Single-instance lock.
//!
//! Two rgbshift processes pushing to the same OpenRGB server would fight over the
//! LEDs, so the main loop holds an exclusive `flock` on
//! `$XDG_RUNTIME_DIR/rgbshift.lock` for its lifetime. The file holds the owner's
//! PID so a second instance can say who is in the way.
//!
//! The file is opened without truncation and only rewritten once the lock is
//! held, so a losing process never wipes the winner's PID.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::logger::Log;

/// Default lock file location.
pub fn lock_path() -> PathBuf {
    let runtime_dir = std::env::var_os("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir);
    runtime_dir.join("rgbshift.lock")
}

/// Exclusive lock held for the lifetime of the value. Dropping it releases the
/// lock and removes the file.
#[derive(Debug)]
pub struct InstanceLock {
    file: Option<File>,
    path: PathBuf,
    log: Log,
}

impl InstanceLock {
    /// Take the lock at `path`.
    ///
    /// # Errors
    /// Fails if the file cannot be opened or another process holds the lock.
    pub fn acquire(path: &Path, log: Log) -> Result<Self> {
        let mut file = open_without_truncate(path)?;

        if file.try_lock_exclusive().is_err() {
            let owner = read_owner(path)
                .map(|pid| format!(" (PID {})", pid))
                .unwrap_or_default();
            anyhow::bail!(
                "Another instance of rgbshift is already running{}.\n\
                Stop it before starting a new one.",
                owner
            );
        }

        file.set_len(0).context("Failed to truncate lock file")?;
        file.seek(SeekFrom::Start(0))
            .context("Failed to rewind lock file")?;
        writeln!(file, "{}", std::process::id()).context("Failed to write PID to lock file")?;
        file.flush().context("Failed to flush lock file")?;

        log.log_debug(&format!("Lock acquired at {}", path.display()));

        Ok(Self {
            file: Some(file),
            path: path.to_path_buf(),
            log,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        drop(self.file.take());

        match fs::remove_file(&self.path) {
            Ok(()) => self.log.log_decorated("Lock file removed"),
            Err(e) => self
                .log
                .log_warning(&format!("Failed to remove lock file: {}", e)),
        }
    }
}

/// PID of the process holding the lock at `path`, if any.
pub fn running_instance(path: &Path) -> Option<u32> {
    let file = OpenOptions::new().read(true).open(path).ok()?;
    if file.try_lock_exclusive().is_ok() {
        // Nobody holds it; a leftover file from a crash
        let _ = FileExt::unlock(&file);
        return None;
    }
    read_owner(path)
}

fn open_without_truncate(path: &Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .with_context(|| format!("Failed to open lock file {}", path.display()))
}

fn read_owner(path: &Path) -> Option<u32> {
    fs::read_to_string(path).ok()?.trim().lines().next()?.parse().ok()
}
