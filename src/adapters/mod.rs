//! Adapter implementations of the port traits.
//!
//! - `live`: real clock, disk, and random ids.
//! - `fixed`: deterministic clock, ids, and permissions for tests and demos.
//! - `memory`: an in-process filesystem.

pub mod fixed;
pub mod live;
pub mod memory;
