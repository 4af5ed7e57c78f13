//! In-process adapters.

pub mod filesystem;

pub use filesystem::MemoryFileSystem;
