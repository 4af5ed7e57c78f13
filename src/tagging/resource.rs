//! Resource edits inside a draft.

use std::collections::BTreeSet;

use tracing::warn;

use super::{after_field_edit, check_new_version, on_delete, on_restore, rediff, DeleteEffect};
use crate::context::ServiceContext;
use crate::error::{Error, Result};
use crate::model::{
    Action, CollectionRecord, Resource, ResourceFields, ResourceId, ResourcePatch,
};

/// What a delete request did.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// The row and its relations were removed.
    Removed,
    /// The row was kept and tagged `Delete`.
    MarkedDeleted(Resource),
    /// A new revision was dropped and its predecessor restored.
    Unwound(Resource),
}

/// Adds a new resource to the draft, tagged `Create`.
///
/// # Errors
///
/// Returns [`Error::State`] when the collection has no draft.
pub fn add_resource(
    record: &mut CollectionRecord,
    ctx: &ServiceContext,
    fields: ResourceFields,
) -> Result<Resource> {
    let draft = record.require_draft()?;
    let now = ctx.clock.now();
    let resource = Resource {
        id: ResourceId::new(ctx.id_gen.generate_id()),
        versions: BTreeSet::from([draft]),
        filled_in: fields.is_complete(),
        fields,
        action: Some(Action::Create),
        original_resource_id: None,
        back_link_id: None,
        created: now,
        updated: now,
    };
    record.resources.insert(resource.id.clone(), resource.clone());
    Ok(resource)
}

/// Applies a field patch to a staged resource and retags it.
///
/// # Errors
///
/// Returns [`Error::NotFound`] for unknown rows, [`Error::State`] for rows
/// outside the draft or tagged `Delete`/`OldVersion`.
pub fn edit_resource(
    record: &mut CollectionRecord,
    ctx: &ServiceContext,
    id: &ResourceId,
    patch: &ResourcePatch,
) -> Result<Resource> {
    let draft = record.require_draft()?;
    let current = record.staged_resource(&draft, id)?.action;
    let action = after_field_edit(current).inspect_err(|e| warn!(resource = %id, "{e}"))?;

    let resource = record.resource_mut(id)?;
    patch.apply(&mut resource.fields);
    resource.action = Some(action);
    resource.filled_in = resource.fields.is_complete();
    resource.updated = ctx.clock.now();
    Ok(resource.clone())
}

/// Handles a delete request for a staged resource.
///
/// Rows with no published original are removed together with their
/// relations; rows with one are tagged `Delete`; a `NewVersion` row is
/// unwound via [`restore_from_new_version`].
///
/// # Errors
///
/// Returns [`Error::NotFound`] for unknown rows and [`Error::State`] for
/// rows outside the draft or tagged `OldVersion`.
pub fn delete_resource(
    record: &mut CollectionRecord,
    ctx: &ServiceContext,
    id: &ResourceId,
) -> Result<DeleteOutcome> {
    let draft = record.require_draft()?;
    let staged = record.staged_resource(&draft, id)?;
    let has_original = match &staged.original_resource_id {
        Some(original) => record.resources.contains_key(original),
        None => false,
    };

    match on_delete(staged.action, has_original)? {
        DeleteEffect::Remove => {
            record.remove_resource(id);
            Ok(DeleteOutcome::Removed)
        }
        DeleteEffect::MarkDeleted => {
            let resource = record.resource_mut(id)?;
            resource.action = Some(Action::Delete);
            resource.updated = ctx.clock.now();
            Ok(DeleteOutcome::MarkedDeleted(resource.clone()))
        }
        DeleteEffect::UnwindNewVersion => {
            restore_from_new_version(record, ctx, id).map(DeleteOutcome::Unwound)
        }
    }
}

/// Restores a resource tagged `Delete`, re-diffing it against its original.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the row or its original is missing and
/// [`Error::State`] unless the row is tagged `Delete`.
pub fn restore_resource(
    record: &mut CollectionRecord,
    ctx: &ServiceContext,
    id: &ResourceId,
) -> Result<Resource> {
    let draft = record.require_draft()?;
    let staged = record.staged_resource(&draft, id)?;
    let matches = matches_original(record, staged)?;
    let action = on_restore(staged.action, matches)?;

    let resource = record.resource_mut(id)?;
    resource.action = Some(action);
    resource.updated = ctx.clock.now();
    Ok(resource.clone())
}

/// Starts a new revision of a staged resource.
///
/// The new row copies the prior row's content and original reference, is
/// tagged `NewVersion`, and back-links to the prior row, which becomes
/// `OldVersion`.
///
/// # Errors
///
/// Returns [`Error::State`] for rows that were never published or are
/// marked for deletion, and [`Error::Conflict`] for rows already in a chain.
pub fn start_new_version(
    record: &mut CollectionRecord,
    ctx: &ServiceContext,
    id: &ResourceId,
) -> Result<Resource> {
    let draft = record.require_draft()?;
    let prior = record.staged_resource(&draft, id)?;
    check_new_version(prior.action).inspect_err(|e| warn!(resource = %id, "{e}"))?;

    let now = ctx.clock.now();
    let revision = Resource {
        id: ResourceId::new(ctx.id_gen.generate_id()),
        versions: BTreeSet::from([draft]),
        fields: prior.fields.clone(),
        filled_in: prior.filled_in,
        action: Some(Action::NewVersion),
        original_resource_id: prior.original_resource_id.clone(),
        back_link_id: Some(prior.id.clone()),
        created: now,
        updated: now,
    };

    let prior = record.resource_mut(id)?;
    prior.action = Some(Action::OldVersion);
    prior.updated = now;
    record.resources.insert(revision.id.clone(), revision.clone());
    Ok(revision)
}

/// Drops a `NewVersion` row and restores the row it superseded.
///
/// The predecessor becomes `Clone` when its content equals the last
/// published content of the same resource, `Update` otherwise.
///
/// # Errors
///
/// Returns [`Error::State`] unless `id` is a `NewVersion` row with a
/// back-link, and [`Error::NotFound`] if the predecessor or the published
/// original is missing.
pub fn restore_from_new_version(
    record: &mut CollectionRecord,
    ctx: &ServiceContext,
    id: &ResourceId,
) -> Result<Resource> {
    let draft = record.require_draft()?;
    let head = record.staged_resource(&draft, id)?;
    let (Some(Action::NewVersion), Some(back_link)) = (head.action, head.back_link_id.clone())
    else {
        return Err(Error::state(format!("resource {id} is not a new version")));
    };

    let predecessor = record
        .staged_resource(&draft, &back_link)
        .map_err(|_| Error::not_found("previous version of resource", &back_link))?;
    if predecessor.action != Some(Action::OldVersion) {
        return Err(Error::state(format!("resource {back_link} is not superseded")));
    }
    let action = rediff(matches_original(record, predecessor)?);

    record.remove_resource(id);
    let restored = record.resource_mut(&back_link)?;
    restored.action = Some(action);
    restored.updated = ctx.clock.now();
    Ok(restored.clone())
}

/// Whether a staged row's content equals its published original's.
fn matches_original(record: &CollectionRecord, staged: &Resource) -> Result<bool> {
    let original_id = staged
        .original_resource_id
        .as_ref()
        .ok_or_else(|| Error::state(format!("resource {} has no original", staged.id)))?;
    let original = record
        .resource(original_id)
        .map_err(|_| Error::not_found("original resource", original_id))?;
    Ok(original.fields == staged.fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft;
    use crate::model::Collection;
    use chrono::{TimeZone, Utc};

    fn ctx() -> ServiceContext {
        ServiceContext::in_memory(Utc.with_ymd_and_hms(2026, 4, 1, 8, 0, 0).unwrap())
    }

    fn fields(title: &str) -> ResourceFields {
        ResourceFields {
            title: title.into(),
            description: "about".into(),
            resource_type: "dataset".into(),
            identifier: format!("https://example.org/{title}"),
            identifier_type: "URL".into(),
            version_label: String::new(),
        }
    }

    /// A record whose draft holds one `Clone` of a published resource.
    fn cloned_record(ctx: &ServiceContext) -> (CollectionRecord, ResourceId, ResourceId) {
        let now = ctx.clock.now();
        let mut record = CollectionRecord::new(Collection {
            id: "c-1".into(),
            title: "Atlas".into(),
            description: String::new(),
            identifier: "atlas".into(),
            creators: Vec::new(),
            created: now,
            updated: now,
        });
        draft::get_or_create(&mut record, ctx).unwrap();
        let created = add_resource(&mut record, ctx, fields("A")).unwrap();
        crate::publish::publish(&mut record, ctx).unwrap();
        draft::get_or_create(&mut record, ctx).unwrap();
        let staged = record
            .resources
            .values()
            .find(|r| r.original_resource_id.as_ref() == Some(&created.id))
            .unwrap()
            .id
            .clone();
        (record, created.id, staged)
    }

    #[test]
    fn new_rows_are_created_and_stay_created() {
        let ctx = ctx();
        let (mut record, _, _) = cloned_record(&ctx);
        let added = add_resource(&mut record, &ctx, ResourceFields::default()).unwrap();
        assert_eq!(added.action, Some(Action::Create));
        assert!(!added.filled_in);

        let patch = ResourcePatch { title: Some("B".into()), ..ResourcePatch::default() };
        let edited = edit_resource(&mut record, &ctx, &added.id, &patch).unwrap();
        assert_eq!(edited.action, Some(Action::Create));
    }

    #[test]
    fn editing_a_clone_makes_it_an_update() {
        let ctx = ctx();
        let (mut record, _, staged) = cloned_record(&ctx);
        let patch = ResourcePatch { title: Some("B".into()), ..ResourcePatch::default() };
        let edited = edit_resource(&mut record, &ctx, &staged, &patch).unwrap();
        assert_eq!(edited.action, Some(Action::Update));
        assert_eq!(edited.fields.title, "B");
    }

    #[test]
    fn delete_then_restore_returns_to_clone_or_update() {
        let ctx = ctx();
        let (mut record, _, staged) = cloned_record(&ctx);

        let outcome = delete_resource(&mut record, &ctx, &staged).unwrap();
        assert!(matches!(outcome, DeleteOutcome::MarkedDeleted(ref r) if r.action == Some(Action::Delete)));
        assert_eq!(restore_resource(&mut record, &ctx, &staged).unwrap().action, Some(Action::Clone));

        let patch = ResourcePatch { description: Some("changed".into()), ..ResourcePatch::default() };
        edit_resource(&mut record, &ctx, &staged, &patch).unwrap();
        delete_resource(&mut record, &ctx, &staged).unwrap();
        assert_eq!(restore_resource(&mut record, &ctx, &staged).unwrap().action, Some(Action::Update));
    }

    #[test]
    fn deleted_rows_reject_edits() {
        let ctx = ctx();
        let (mut record, _, staged) = cloned_record(&ctx);
        delete_resource(&mut record, &ctx, &staged).unwrap();
        let patch = ResourcePatch { title: Some("B".into()), ..ResourcePatch::default() };
        assert!(matches!(edit_resource(&mut record, &ctx, &staged, &patch), Err(Error::State(_))));
    }

    #[test]
    fn deleting_a_created_row_removes_it() {
        let ctx = ctx();
        let (mut record, _, _) = cloned_record(&ctx);
        let added = add_resource(&mut record, &ctx, fields("new")).unwrap();
        assert_eq!(delete_resource(&mut record, &ctx, &added.id).unwrap(), DeleteOutcome::Removed);
        assert!(!record.resources.contains_key(&added.id));
    }

    #[test]
    fn new_version_chains_and_unwinds() {
        let ctx = ctx();
        let (mut record, published, staged) = cloned_record(&ctx);

        let head = start_new_version(&mut record, &ctx, &staged).unwrap();
        assert_eq!(head.action, Some(Action::NewVersion));
        assert_eq!(head.back_link_id.as_ref(), Some(&staged));
        assert_eq!(head.original_resource_id.as_ref(), Some(&published));
        assert_eq!(record.resource(&staged).unwrap().action, Some(Action::OldVersion));

        assert!(matches!(start_new_version(&mut record, &ctx, &head.id), Err(Error::Conflict(_))));
        assert!(matches!(start_new_version(&mut record, &ctx, &staged), Err(Error::Conflict(_))));

        let outcome = delete_resource(&mut record, &ctx, &head.id).unwrap();
        assert!(matches!(outcome, DeleteOutcome::Unwound(ref r) if r.id == staged));
        assert!(!record.resources.contains_key(&head.id));
        assert_eq!(record.resource(&staged).unwrap().action, Some(Action::Clone));
    }

    #[test]
    fn unwinding_keeps_predecessor_edits() {
        let ctx = ctx();
        let (mut record, _, staged) = cloned_record(&ctx);
        let patch = ResourcePatch { title: Some("Edited".into()), ..ResourcePatch::default() };
        edit_resource(&mut record, &ctx, &staged, &patch).unwrap();

        let head = start_new_version(&mut record, &ctx, &staged).unwrap();
        let restored = restore_from_new_version(&mut record, &ctx, &head.id).unwrap();
        assert_eq!(restored.action, Some(Action::Update));
    }

    #[test]
    fn created_rows_cannot_be_revised() {
        let ctx = ctx();
        let (mut record, _, _) = cloned_record(&ctx);
        let added = add_resource(&mut record, &ctx, fields("fresh")).unwrap();
        assert!(matches!(start_new_version(&mut record, &ctx, &added.id), Err(Error::State(_))));
    }

    #[test]
    fn published_rows_are_not_editable() {
        let ctx = ctx();
        let (mut record, published, _) = cloned_record(&ctx);
        let patch = ResourcePatch { title: Some("B".into()), ..ResourcePatch::default() };
        assert!(matches!(edit_resource(&mut record, &ctx, &published, &patch), Err(Error::State(_))));
    }
}
