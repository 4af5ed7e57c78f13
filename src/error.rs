//! Error taxonomy for core operations.

use std::fmt::Display;

use crate::store::StoreError;
use crate::validate::ValidationIssue;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by core operations.
///
/// Validation failures carry every issue found; all other variants describe
/// the single cause that aborted the operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A collection, version, resource, or relation does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity that was looked up.
        entity: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// The request contradicts the current state of the collection
    /// (multiple drafts, dangling relation target, self-relation, double
    /// revision chain, concurrent commit).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Required fields are missing.
    #[error("validation failed with {} issue(s)", .0.len())]
    Validation(Vec<ValidationIssue>),

    /// The operation is not allowed in the current lifecycle state.
    #[error("invalid state: {0}")]
    State(String),

    /// The persistent store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Error {
    /// Builds a [`Error::NotFound`].
    pub fn not_found(entity: &'static str, id: impl Display) -> Self {
        Self::NotFound { entity, id: id.to_string() }
    }

    /// Builds a [`Error::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Builds a [`Error::State`].
    pub fn state(message: impl Into<String>) -> Self {
        Self::State(message.into())
    }

    /// Returns the validation issues if this is a validation error.
    #[must_use]
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            Self::Validation(issues) => issues,
            _ => &[],
        }
    }
}
