//! What publishing does with a staged relation, given its own tag and the
//! tag of the resource that owns it.

use crate::model::Action;

/// Fate of one staged relation row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Reattach the original relation to the new version unchanged.
    Carry,
    /// Overwrite the original relation's fields, then reattach it.
    Rewrite,
    /// Leave the original out of the new version.
    Drop,
    /// Promote the staged row to a published relation.
    Insert,
    /// The owning resource leaves the collection; the row goes with it.
    Discard,
}

/// Looks up the disposition for a (relation tag, resource tag) pair.
///
/// Returns `None` for pairs no sequence of edits can produce.
#[must_use]
pub fn of(relation: Option<Action>, resource: Option<Action>) -> Option<Disposition> {
    let (Some(relation), Some(resource)) = (relation, resource) else {
        return None;
    };
    let disposition = match (relation, resource) {
        (Action::NewVersion | Action::OldVersion, _) => return None,
        (_, Action::Delete | Action::OldVersion) => Disposition::Discard,
        (Action::Create, _) => Disposition::Insert,
        (_, Action::Create | Action::NewVersion) => return None,
        (Action::Clone, _) => Disposition::Carry,
        (Action::Update, _) => Disposition::Rewrite,
        (Action::Delete, _) => Disposition::Drop,
    };
    Some(disposition)
}
