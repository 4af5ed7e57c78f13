//! Permission gate consulted before core operations run.

use crate::model::CollectionId;

/// Decides whether an actor may edit or publish a collection.
///
/// The core never calls this itself; front-ends evaluate it before
/// invoking an operation.
pub trait PermissionGate: Send + Sync {
    /// Returns `true` if `actor` may modify the draft of `collection`.
    fn can_edit(&self, actor: &str, collection: &CollectionId) -> bool;

    /// Returns `true` if `actor` may publish `collection`.
    fn can_publish(&self, actor: &str, collection: &CollectionId) -> bool;
}
