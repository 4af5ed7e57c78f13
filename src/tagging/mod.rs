//! Action tagging: how edits move a staged row between action tags.
//!
//! The transition table is shared by resources and relations:
//!
//! | current                | edit          | result                                  |
//! |------------------------|---------------|-----------------------------------------|
//! | none (no original)     | field edit    | `Create`                                |
//! | `Clone`                | field edit    | `Update`                                |
//! | `Update`/`Create`/`NewVersion` | field edit | unchanged                           |
//! | has original           | delete        | `Delete`                                |
//! | `Create`               | delete        | row removed                             |
//! | `Delete`               | restore       | `Clone` if equal to original, else `Update` |
//!
//! Rows tagged `Delete` or `OldVersion` reject field edits.

mod resource;

use crate::error::{Error, Result};
use crate::model::Action;

pub use resource::{
    add_resource, delete_resource, edit_resource, restore_from_new_version, restore_resource,
    start_new_version, DeleteOutcome,
};

/// What a delete request does to a staged row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteEffect {
    /// Drop the row outright; nothing published refers to it.
    Remove,
    /// Keep the row, tagged [`Action::Delete`], so it can be restored.
    MarkDeleted,
    /// Undo the revision chain the row heads.
    UnwindNewVersion,
}

/// Tag after a field edit.
///
/// # Errors
///
/// Returns [`Error::State`] for rows tagged `Delete` (restore first) or
/// `OldVersion` (edit the new revision instead).
pub fn after_field_edit(current: Option<Action>) -> Result<Action> {
    match current {
        None | Some(Action::Create) => Ok(Action::Create),
        Some(Action::Clone | Action::Update) => Ok(Action::Update),
        Some(Action::NewVersion) => Ok(Action::NewVersion),
        Some(Action::Delete) => Err(Error::state("row is marked for deletion; restore it to edit")),
        Some(Action::OldVersion) => {
            Err(Error::state("row is superseded by a new version; edit the new version instead"))
        }
    }
}

/// Effect of a delete request.
///
/// # Errors
///
/// Returns [`Error::State`] for `OldVersion` rows, which only go away by
/// unwinding the revision that superseded them.
pub fn on_delete(current: Option<Action>, has_original: bool) -> Result<DeleteEffect> {
    match current {
        Some(Action::NewVersion) => Ok(DeleteEffect::UnwindNewVersion),
        Some(Action::OldVersion) => {
            Err(Error::state("row is superseded by a new version; delete the new version instead"))
        }
        Some(Action::Clone | Action::Update | Action::Delete) if has_original => {
            Ok(DeleteEffect::MarkDeleted)
        }
        _ => Ok(DeleteEffect::Remove),
    }
}

/// Tag after restoring a deleted row, given whether its content still
/// equals the original's.
///
/// # Errors
///
/// Returns [`Error::State`] unless the row is tagged `Delete`.
pub fn on_restore(current: Option<Action>, matches_original: bool) -> Result<Action> {
    match current {
        Some(Action::Delete) => Ok(rediff(matches_original)),
        _ => Err(Error::state("only rows marked for deletion can be restored")),
    }
}

/// `Clone` when content equals the original, `Update` otherwise.
#[must_use]
pub fn rediff(matches_original: bool) -> Action {
    if matches_original {
        Action::Clone
    } else {
        Action::Update
    }
}

/// Checks that a row may head a new revision chain.
///
/// # Errors
///
/// Returns [`Error::State`] for `Create` rows (nothing published to
/// revise) and `Delete` rows, and [`Error::Conflict`] for rows already part
/// of a chain.
pub fn check_new_version(current: Option<Action>) -> Result<()> {
    match current {
        Some(Action::Clone | Action::Update) => Ok(()),
        Some(Action::Create) | None => {
            Err(Error::state("resource has never been published; it cannot be revised yet"))
        }
        Some(Action::Delete) => Err(Error::state("resource is marked for deletion; restore it first")),
        Some(Action::NewVersion | Action::OldVersion) => {
            Err(Error::conflict("resource already has a new version in this draft"))
        }
    }
}

/// Checks the original-reference invariant: every tag except `Create`
/// carries an original, `Create` never does.
///
/// # Errors
///
/// Returns [`Error::State`] describing the inconsistency.
pub fn check_original(action: Option<Action>, has_original: bool) -> Result<()> {
    match action {
        Some(Action::Create) if has_original => {
            Err(Error::state("row tagged create must not reference an original"))
        }
        Some(tag) if tag.requires_original() && !has_original => {
            Err(Error::state(format!("row tagged {tag} must reference an original")))
        }
        _ => Ok(()),
    }
}
