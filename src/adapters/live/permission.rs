//! Live adapter for the `PermissionGate` port.

use crate::model::CollectionId;
use crate::ports::PermissionGate;

/// Gate for single-user local stores: every actor may edit and publish.
pub struct LocalPermissionGate;

impl PermissionGate for LocalPermissionGate {
    fn can_edit(&self, _actor: &str, _collection: &CollectionId) -> bool {
        true
    }

    fn can_publish(&self, _actor: &str, _collection: &CollectionId) -> bool {
        true
    }
}
