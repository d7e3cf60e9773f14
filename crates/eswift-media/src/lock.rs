//! Per-path mutual exclusion.
//!
//! Two saves that target the same image file must not interleave their
//! read-transform-write sequences. [`PathLocks`] hands out one exclusive
//! guard per path; guards for different paths never block each other.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{ArcMutexGuard, Mutex, RawMutex};

/// Registry of per-path locks.
///
/// Entries are created on demand and removed once the last guard for a
/// path is released, so the map only holds paths that are in use.
#[derive(Debug, Default)]
pub struct PathLocks {
    entries: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl PathLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until `path` is free, then hold it until the guard is dropped.
    ///
    /// Paths are keyed by [`resolve_path`], so `a/../b.jpg`, `b.jpg`, its
    /// absolute form and any symlink to it all share one lock.
    pub fn lock(&self, path: &Path) -> PathGuard<'_> {
        let key = resolve_path(path);

        let entry = {
            let mut entries = self.entries.lock();
            Arc::clone(entries.entry(key.clone()).or_default())
        };

        PathGuard {
            registry: self,
            key,
            guard: Some(entry.lock_arc()),
        }
    }

    /// Number of paths currently locked or waited on.
    pub fn active(&self) -> usize {
        self.entries.lock().len()
    }

    fn release(&self, key: &Path) {
        let mut entries = self.entries.lock();
        // Only the registry's own handle left: nobody holds or waits on it
        if entries
            .get(key)
            .is_some_and(|entry| Arc::strong_count(entry) == 1)
        {
            entries.remove(key);
        }
    }
}

/// The real location of `path`.
///
/// Existing files are canonicalized, which follows symlinks. A missing file
/// gets its canonical parent directory joined with its file name. When the
/// parent does not exist either, `path` is returned as given.
pub fn resolve_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = std::fs::canonicalize(path) {
        return resolved;
    }

    let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
        return path.to_path_buf();
    };
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };

    std::fs::canonicalize(parent)
        .map(|dir| dir.join(name))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Exclusive hold on one path. Released on drop.
pub struct PathGuard<'a> {
    registry: &'a PathLocks,
    key: PathBuf,
    guard: Option<ArcMutexGuard<RawMutex, ()>>,
}

impl PathGuard<'_> {
    /// The resolved path this guard holds.
    pub fn path(&self) -> &Path {
        &self.key
    }
}

impl Drop for PathGuard<'_> {
    fn drop(&mut self) {
        // Unlock before pruning so the strong count no longer includes us
        self.guard.take();
        self.registry.release(&self.key);
    }
}
