//! Permission gate with preset answers.

use crate::model::CollectionId;
use crate::ports::PermissionGate;

/// Answers every question with the flags it was built with.
#[derive(Debug, Clone, Copy)]
pub struct FixedPermissionGate {
    /// Answer for [`PermissionGate::can_edit`].
    pub edit: bool,
    /// Answer for [`PermissionGate::can_publish`].
    pub publish: bool,
}

impl FixedPermissionGate {
    /// A gate that lets an actor edit drafts but not publish them.
    #[must_use]
    pub fn editor() -> Self {
        Self { edit: true, publish: false }
    }

    /// A gate that denies everything.
    #[must_use]
    pub fn viewer() -> Self {
        Self { edit: false, publish: false }
    }
}

impl PermissionGate for FixedPermissionGate {
    fn can_edit(&self, _actor: &str, _collection: &CollectionId) -> bool {
        self.edit
    }

    fn can_publish(&self, _actor: &str, _collection: &CollectionId) -> bool {
        self.publish
    }
}
