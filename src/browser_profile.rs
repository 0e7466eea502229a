//! Chrome profile directory management
//!
//! Every browser launch gets its own UUID-named profile directory so that a
//! recycled instance never trips over the SingletonLock of its predecessor.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Prefix of every profile directory this crate creates in the temp dir.
pub const PROFILE_PREFIX: &str = "harvester_chrome";

/// RAII wrapper for a Chrome profile directory
///
/// Removes the directory on drop unless `into_path()` transferred ownership
/// to another cleanup mechanism.
#[derive(Debug)]
pub struct BrowserProfile {
    path: PathBuf,
    cleanup_on_drop: bool,
}

impl BrowserProfile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            cleanup_on_drop: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Consume the profile and return the path, disabling auto-cleanup
    pub fn into_path(mut self) -> PathBuf {
        self.cleanup_on_drop = false;
        std::mem::take(&mut self.path)
    }
}

impl Drop for BrowserProfile {
    fn drop(&mut self) {
        if self.cleanup_on_drop && self.path.exists() {
            info!("BrowserProfile cleanup: removing {}", self.path.display());
            if let Err(e) = std::fs::remove_dir_all(&self.path) {
                warn!("Failed to cleanup profile directory {}: {}", self.path.display(), e);
            }
        }
    }
}

/// Create a unique profile directory `{temp}/{prefix}_{uuid}`
///
/// Uses `create_dir` rather than `create_dir_all` so an (unlikely) UUID
/// collision fails instead of sharing a directory.
pub fn create_unique_profile_with_prefix(prefix: &str) -> Result<BrowserProfile> {
    let path = std::env::temp_dir().join(format!("{}_{}", prefix, Uuid::new_v4()));

    debug!("Creating unique Chrome profile: {}", path.display());

    std::fs::create_dir(&path)
        .with_context(|| format!("Failed to create profile directory: {}", path.display()))?;

    Ok(BrowserProfile::new(path))
}

/// Whether the SingletonLock in `profile_dir` belongs to a dead process.
///
/// The lock is a symlink to `{hostname}-{pid}`. Without a lock the directory
/// is free. On Linux the pid is checked against `/proc`; elsewhere a present
/// lock is conservatively treated as live.
pub fn is_singleton_lock_stale(profile_dir: &Path) -> bool {
    let lock_path = profile_dir.join("SingletonLock");

    if !lock_path.exists() && !lock_path.is_symlink() {
        return true;
    }

    let Ok(target) = std::fs::read_link(&lock_path) else {
        // A regular file where a symlink should be is a leftover from a crash
        return lock_path.is_file();
    };

    let target = target.to_string_lossy();
    let Some(pid) = target.rsplit('-').next().and_then(|p| p.parse::<u32>().ok()) else {
        warn!("Could not parse PID from SingletonLock target: {}", target);
        return false;
    };

    if cfg!(target_os = "linux") {
        let alive = Path::new("/proc").join(pid.to_string()).exists();
        debug!(pid, alive, "Checked SingletonLock owner");
        !alive
    } else {
        false
    }
}

/// Remove orphaned profile directories left behind by crashed runs.
///
/// Called once at startup; returns how many directories were removed.
pub fn cleanup_stale_profiles() -> Result<usize> {
    let temp_dir = std::env::temp_dir();
    let mut cleaned = 0;

    let entries = std::fs::read_dir(&temp_dir)
        .with_context(|| format!("Failed to read temp directory: {}", temp_dir.display()))?;

    for entry in entries.flatten() {
        let path = entry.path();

        if let Some(name) = path.file_name().and_then(|n| n.to_str())
            && name.starts_with(PROFILE_PREFIX)
            && path.is_dir()
            && is_singleton_lock_stale(&path)
        {
            info!("Cleaning stale profile: {}", path.display());
            if let Err(e) = std::fs::remove_dir_all(&path) {
                warn!("Failed to remove stale profile {}: {}", path.display(), e);
            } else {
                cleaned += 1;
            }
        }
    }

    if cleaned > 0 {
        info!("Cleaned {} stale Chrome profile directories", cleaned);
    }

    Ok(cleaned)
}
