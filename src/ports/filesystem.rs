//! Filesystem port for file I/O operations.

use std::path::Path;

/// An exclusive lock taken through [`FileSystem::lock_exclusive`],
/// released when dropped.
pub trait LockGuard: Send {}

/// Provides filesystem access for reading and writing files.
///
/// Abstracting the filesystem allows the store to run against memory in
/// tests without touching the real disk.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or is not valid UTF-8.
    fn read_to_string(
        &self,
        path: &Path,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>>;

    /// Replaces the contents of a file, creating it if needed.
    ///
    /// Readers observe either the old or the new contents, never a mix.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails (permissions, disk full, etc.).
    fn write(
        &self,
        path: &Path,
        contents: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Returns `true` if the path exists on the filesystem.
    fn exists(&self, path: &Path) -> bool;

    /// Lists the entries in a directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not a directory or cannot be read.
    fn list_dir(
        &self,
        path: &Path,
    ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>>;

    /// Takes the exclusive lock named by `path`, blocking until no other
    /// holder (in this or another process) has it.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock file cannot be created or locked.
    fn lock_exclusive(
        &self,
        path: &Path,
    ) -> Result<Box<dyn LockGuard>, Box<dyn std::error::Error + Send + Sync>>;
}
