//! Single-instance lock - exclusive flock so only one poller runs.
//!
//! Two pollers against the same bot token fight over updates (Telegram
//! answers the second with 409s), so a second instance must exit cleanly.

use anyhow::{Context, Result};
use nix::fcntl::{Flock, FlockArg};
use std::fs::OpenOptions;
use std::io::Write;

/// Held for the process lifetime; the lock releases when this drops.
pub struct InstanceLock {
    _lock: Flock<std::fs::File>,
}

/// Try to take the exclusive lock at `path`, writing our PID into it.
/// `Ok(None)` means another instance already holds it.
pub fn acquire(path: &str) -> Result<Option<InstanceLock>> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("Failed to open lock file {}", path))?;

    match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
        Ok(mut lock) => {
            let _ = write!(&mut *lock, "{}", std::process::id());
            let _ = lock.flush();
            Ok(Some(InstanceLock { _lock: lock }))
        }
        Err((_, _)) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_acquire_and_contend() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("arkd.lock");
        let path = path.to_str().unwrap();

        let first = acquire(path).unwrap();
        assert!(first.is_some());

        // Same process, second descriptor: flock still refuses
        let second = acquire(path).unwrap();
        assert!(second.is_none());

        drop(first);
        let third = acquire(path).unwrap();
        assert!(third.is_some());
    }

    #[test]
    fn test_lock_file_contains_pid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("arkd.lock");
        let path_str = path.to_str().unwrap();

        let _lock = acquire(path_str).unwrap().unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, std::process::id().to_string());
    }
}
