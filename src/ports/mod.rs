//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the versioning core and an
//! external system (time, ids, disk, access control). Implementations
//! live in `src/adapters/`.

pub mod clock;
pub mod filesystem;
pub mod id_gen;
pub mod permission;

pub use clock::Clock;
pub use filesystem::{FileSystem, LockGuard};
pub use id_gen::IdGenerator;
pub use permission::PermissionGate;
