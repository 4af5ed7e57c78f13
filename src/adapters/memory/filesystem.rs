//! In-memory filesystem for running the store without touching disk.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex, PoisonError};

use crate::ports::filesystem::{FileSystem, LockGuard};

/// A map from paths to file contents.
#[derive(Default)]
pub struct MemoryFileSystem {
    files: Mutex<HashMap<PathBuf, String>>,
    locks: Arc<LockTable>,
}

/// Paths whose lock is currently held.
#[derive(Default)]
struct LockTable {
    held: Mutex<HashSet<PathBuf>>,
    released: Condvar,
}

struct MemoryLockGuard {
    table: Arc<LockTable>,
    path: PathBuf,
}

impl LockGuard for MemoryLockGuard {}

impl Drop for MemoryLockGuard {
    fn drop(&mut self) {
        let mut held = self.table.held.lock().unwrap_or_else(PoisonError::into_inner);
        held.remove(&self.path);
        self.table.released.notify_all();
    }
}

impl MemoryFileSystem {
    /// Creates an empty filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(
        &self,
        path: &Path,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let files = self.files.lock().map_err(|_| "memory filesystem lock poisoned")?;
        files.get(path).cloned().ok_or_else(|| format!("File not found: {}", path.display()).into())
    }

    fn write(
        &self,
        path: &Path,
        contents: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut files = self.files.lock().map_err(|_| "memory filesystem lock poisoned")?;
        files.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let Ok(files) = self.files.lock() else {
            return false;
        };
        // A directory exists when any file lives under it.
        files.contains_key(path) || files.keys().any(|k| k.starts_with(path) && k != path)
    }

    fn list_dir(
        &self,
        path: &Path,
    ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>> {
        let files = self.files.lock().map_err(|_| "memory filesystem lock poisoned")?;
        let mut names: Vec<String> = files
            .keys()
            .filter(|k| k.parent() == Some(path))
            .filter_map(|k| k.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        names.sort();
        Ok(names)
    }

    fn lock_exclusive(
        &self,
        path: &Path,
    ) -> Result<Box<dyn LockGuard>, Box<dyn std::error::Error + Send + Sync>> {
        let mut held = self.locks.held.lock().map_err(|_| "memory lock table poisoned")?;
        while held.contains(path) {
            held = self.locks.released.wait(held).map_err(|_| "memory lock table poisoned")?;
        }
        held.insert(path.to_path_buf());
        Ok(Box::new(MemoryLockGuard { table: Arc::clone(&self.locks), path: path.to_path_buf() }))
    }
}
