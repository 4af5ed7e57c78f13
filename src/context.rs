//! Service context bundling all port trait objects.

use chrono::{DateTime, Utc};

use crate::adapters::fixed::{FixedClock, SequentialIdGenerator};
use crate::adapters::live::clock::LiveClock;
use crate::adapters::live::filesystem::LiveFileSystem;
use crate::adapters::live::id_gen::LiveIdGenerator;
use crate::adapters::live::permission::LocalPermissionGate;
use crate::adapters::memory::MemoryFileSystem;
use crate::ports::clock::Clock;
use crate::ports::filesystem::FileSystem;
use crate::ports::id_gen::IdGenerator;
use crate::ports::permission::PermissionGate;

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. Constructors
/// wire up different adapter implementations (live, fixed, in-memory).
pub struct ServiceContext {
    /// Clock for timestamps and calendar-version weeks.
    pub clock: Box<dyn Clock>,
    /// Filesystem backing the collection store.
    pub fs: Box<dyn FileSystem>,
    /// ID generator for rows, versions, and public labels.
    pub id_gen: Box<dyn IdGenerator>,
    /// Access control consulted by front-ends.
    pub permissions: Box<dyn PermissionGate>,
}

impl ServiceContext {
    /// Creates a live context: system clock, real disk, random ids.
    #[must_use]
    pub fn live() -> Self {
        Self {
            clock: Box::new(LiveClock),
            fs: Box::new(LiveFileSystem),
            id_gen: Box::new(LiveIdGenerator::new()),
            permissions: Box::new(LocalPermissionGate),
        }
    }

    /// Creates a live context whose clock is pinned at `now`, so that
    /// timestamps and version names are reproducible across runs.
    #[must_use]
    pub fn fixed(now: DateTime<Utc>) -> Self {
        Self {
            clock: Box::new(FixedClock::new(now)),
            fs: Box::new(LiveFileSystem),
            id_gen: Box::new(LiveIdGenerator::new()),
            permissions: Box::new(LocalPermissionGate),
        }
    }

    /// Creates a fully in-memory, deterministic context.
    #[must_use]
    pub fn in_memory(now: DateTime<Utc>) -> Self {
        Self {
            clock: Box::new(FixedClock::new(now)),
            fs: Box::new(MemoryFileSystem::new()),
            id_gen: Box::new(SequentialIdGenerator::default()),
            permissions: Box::new(LocalPermissionGate),
        }
    }
}
