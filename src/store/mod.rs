//! Collection store: one YAML document per collection record.
//!
//! Each collection is one YAML document written through the `FileSystem`
//! port. Directory layout:
//!
//! ```text
//! <root>/
//!   └── collections/
//!         ├── <collection-id>.yaml
//!         └── <collection-id>.lock
//! ```
//!
//! A [`Transaction`] holds an in-memory copy of one record and the
//! collection's exclusive lock, so writers in other processes wait for it.
//! Mutations only touch that copy; [`Transaction::commit`] writes it back in
//! a single document write, and dropping the transaction discards it.

mod locks;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::context::ServiceContext;
use crate::error::{Error, Result};
use crate::model::{CollectionId, CollectionRecord};
use crate::ports::LockGuard;

pub use locks::CollectionLocks;

/// Failures of the underlying storage.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A document could not be read.
    #[error("failed to read {path}: {message}")]
    Read {
        /// Document path.
        path: PathBuf,
        /// Underlying error text.
        message: String,
    },
    /// A document could not be written.
    #[error("failed to write {path}: {message}")]
    Write {
        /// Document path.
        path: PathBuf,
        /// Underlying error text.
        message: String,
    },
    /// The collections directory could not be listed.
    #[error("failed to list {path}: {message}")]
    List {
        /// Directory path.
        path: PathBuf,
        /// Underlying error text.
        message: String,
    },
    /// The collection lock could not be taken.
    #[error("failed to lock {path}: {message}")]
    Lock {
        /// Lock file path.
        path: PathBuf,
        /// Underlying error text.
        message: String,
    },
    /// A document is not a valid collection record.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// Document path.
        path: PathBuf,
        /// YAML error.
        source: serde_yaml::Error,
    },
    /// A record could not be serialized.
    #[error("failed to serialize collection {id}: {source}")]
    Serialize {
        /// Collection id.
        id: CollectionId,
        /// YAML error.
        source: serde_yaml::Error,
    },
}

/// Persistence layer for collection records.
///
/// All I/O goes through `ctx.fs` so that the store works against the real
/// disk and the in-memory filesystem alike.
pub struct CollectionStore<'a> {
    ctx: &'a ServiceContext,
    root: PathBuf,
}

impl<'a> CollectionStore<'a> {
    /// Creates a new store rooted at the given path.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext, root: &Path) -> Self {
        Self { ctx, root: root.to_path_buf() }
    }

    /// Writes a brand-new record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] if the collection already exists, or a
    /// store error if writing fails.
    pub fn create(&self, record: &CollectionRecord) -> Result<()> {
        let path = self.record_path(record.id());
        if self.ctx.fs.exists(&path) {
            return Err(Error::conflict(format!("collection {} already exists", record.id())));
        }
        self.write(record)
    }

    /// Loads a record by collection id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for unknown collections, or a store error
    /// if the document cannot be read or parsed.
    pub fn load(&self, id: &CollectionId) -> Result<CollectionRecord> {
        let path = self.record_path(id);
        if !self.ctx.fs.exists(&path) {
            return Err(Error::not_found("collection", id));
        }
        let contents = self
            .ctx
            .fs
            .read_to_string(&path)
            .map_err(|e| StoreError::Read { path: path.clone(), message: e.to_string() })?;
        let record = serde_yaml::from_str(&contents)
            .map_err(|source| StoreError::Parse { path, source })?;
        Ok(record)
    }

    /// Lists every collection id in the store.
    ///
    /// # Errors
    ///
    /// Returns a store error if the collections directory cannot be listed.
    pub fn list(&self) -> Result<Vec<CollectionId>> {
        let dir = self.root.join("collections");
        if !self.ctx.fs.exists(&dir) {
            return Ok(Vec::new());
        }
        let entries = self
            .ctx
            .fs
            .list_dir(&dir)
            .map_err(|e| StoreError::List { path: dir.clone(), message: e.to_string() })?;
        Ok(entries
            .into_iter()
            .filter_map(|name| name.strip_suffix(".yaml").map(CollectionId::from))
            .collect())
    }

    /// Opens a transaction over one collection, blocking until the
    /// collection's lock is free.
    ///
    /// # Errors
    ///
    /// Returns a store error if the lock cannot be taken, and otherwise the
    /// same errors as [`CollectionStore::load`].
    pub fn begin(&self, id: &CollectionId) -> Result<Transaction<'_, 'a>> {
        if !self.ctx.fs.exists(&self.record_path(id)) {
            return Err(Error::not_found("collection", id));
        }
        let path = self.root.join("collections").join(format!("{id}.lock"));
        let lock = self
            .ctx
            .fs
            .lock_exclusive(&path)
            .map_err(|e| StoreError::Lock { path, message: e.to_string() })?;
        let record = self.load(id)?;
        let base_revision = record.revision;
        Ok(Transaction { store: self, record, base_revision, _lock: lock })
    }

    fn write(&self, record: &CollectionRecord) -> Result<()> {
        let path = self.record_path(record.id());
        let yaml = serde_yaml::to_string(record)
            .map_err(|source| StoreError::Serialize { id: record.id().clone(), source })?;
        self.ctx
            .fs
            .write(&path, &yaml)
            .map_err(|e| StoreError::Write { path, message: e.to_string() })?;
        Ok(())
    }

    fn record_path(&self, id: &CollectionId) -> PathBuf {
        self.root.join("collections").join(format!("{id}.yaml"))
    }
}

/// An open, uncommitted change to one collection record.
pub struct Transaction<'s, 'a> {
    store: &'s CollectionStore<'a>,
    record: CollectionRecord,
    base_revision: u64,
    _lock: Box<dyn LockGuard>,
}

impl Transaction<'_, '_> {
    /// The working copy.
    #[must_use]
    pub fn record(&self) -> &CollectionRecord {
        &self.record
    }

    /// The working copy, mutably.
    pub fn record_mut(&mut self) -> &mut CollectionRecord {
        &mut self.record
    }

    /// Writes the working copy back to the store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] if the document changed since the
    /// transaction began (a writer that bypassed the lock), or a store
    /// error if the write fails.
    pub fn commit(mut self) -> Result<CollectionRecord> {
        let current = self.store.load(self.record.id())?.revision;
        if current != self.base_revision {
            return Err(Error::conflict(format!(
                "collection {} changed concurrently (revision {} is now {current})",
                self.record.id(),
                self.base_revision
            )));
        }
        self.record.revision = self.base_revision + 1;
        self.store.write(&self.record)?;
        debug!(collection = %self.record.id(), revision = self.record.revision, "committed");
        Ok(self.record)
    }
}
