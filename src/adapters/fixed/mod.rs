//! Deterministic adapters.
//!
//! Tests use all of them so that ids, timestamps, and calendar-version
//! names are reproducible. `FOLIO_FIXED_TIME` runs use the clock only.

pub mod clock;
pub mod id_gen;
pub mod permission;

pub use clock::FixedClock;
pub use id_gen::SequentialIdGenerator;
pub use permission::FixedPermissionGate;
