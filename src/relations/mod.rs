//! Relation edits inside a draft.
//!
//! Relations follow the same tags as resources, scoped to the staged
//! resource that owns them. An internal relation's target is compared by
//! published identity: a staged clone stands for the row it copies.

use std::collections::BTreeSet;

use tracing::warn;

use crate::context::ServiceContext;
use crate::error::{Error, Result};
use crate::model::{
    Action, CollectionRecord, ExternalFields, ExternalRelation, InternalFields, InternalRelation,
    RelationId, ResourceId, VersionId,
};
use crate::tagging::{on_delete, on_restore, rediff, DeleteEffect};

/// What a relation delete request did.
#[derive(Debug, Clone, PartialEq)]
pub enum RelationDeleteOutcome<R> {
    /// The row had no original and was removed.
    Removed,
    /// The row was kept and tagged `Delete`.
    MarkedDeleted(R),
}

/// Adds an internal relation from `source` to another resource of the draft.
///
/// # Errors
///
/// Returns [`Error::Conflict`] for a self-relation, [`Error::NotFound`] if
/// the target is not a resource of the draft, and [`Error::State`] if the
/// source is not an editable staged resource.
pub fn add_internal(
    record: &mut CollectionRecord,
    ctx: &ServiceContext,
    source: &ResourceId,
    fields: InternalFields,
) -> Result<InternalRelation> {
    let draft = record.require_draft()?;
    check_target(record, &draft, source, &fields.target_id)?;
    check_source(record, &draft, source)?;

    let now = ctx.clock.now();
    let relation = InternalRelation {
        id: RelationId::new(ctx.id_gen.generate_id()),
        versions: BTreeSet::from([draft]),
        source_id: source.clone(),
        fields,
        action: Some(Action::Create),
        original_relation_id: None,
        mirror: false,
        created: now,
        updated: now,
    };
    record.internal_relations.insert(relation.id.clone(), relation.clone());
    Ok(relation)
}

/// Adds an external relation from `source`.
///
/// # Errors
///
/// Returns [`Error::State`] if the source is not an editable staged resource.
pub fn add_external(
    record: &mut CollectionRecord,
    ctx: &ServiceContext,
    source: &ResourceId,
    fields: ExternalFields,
) -> Result<ExternalRelation> {
    let draft = record.require_draft()?;
    check_source(record, &draft, source)?;

    let now = ctx.clock.now();
    let relation = ExternalRelation {
        id: RelationId::new(ctx.id_gen.generate_id()),
        versions: BTreeSet::from([draft]),
        source_id: source.clone(),
        fields,
        action: Some(Action::Create),
        original_relation_id: None,
        created: now,
        updated: now,
    };
    record.external_relations.insert(relation.id.clone(), relation.clone());
    Ok(relation)
}

/// Replaces the fields of a staged internal relation and retags it.
///
/// # Errors
///
/// As [`add_internal`] for the new target, plus [`Error::State`] for rows
/// tagged `Delete`.
pub fn edit_internal(
    record: &mut CollectionRecord,
    ctx: &ServiceContext,
    id: &RelationId,
    fields: InternalFields,
) -> Result<InternalRelation> {
    let draft = record.require_draft()?;
    let relation = staged_internal(record, &draft, id)?;
    let source = relation.source_id.clone();
    check_target(record, &draft, &source, &fields.target_id)?;
    check_source(record, &draft, &source)?;

    let matches = match &relation.original_relation_id {
        Some(original) => Some(internal_matches(record, original, &fields)?),
        None => None,
    };
    let action = after_relation_edit(relation.action, matches).inspect_err(|e| warn!(relation = %id, "{e}"))?;

    let relation = record.internal_mut(id)?;
    relation.fields = fields;
    relation.action = Some(action);
    relation.updated = ctx.clock.now();
    Ok(relation.clone())
}

/// Replaces the fields of a staged external relation and retags it.
///
/// # Errors
///
/// Returns [`Error::State`] for rows tagged `Delete` or owned by a resource
/// that is not editable.
pub fn edit_external(
    record: &mut CollectionRecord,
    ctx: &ServiceContext,
    id: &RelationId,
    fields: ExternalFields,
) -> Result<ExternalRelation> {
    let draft = record.require_draft()?;
    let relation = staged_external(record, &draft, id)?;
    check_source(record, &draft, &relation.source_id)?;

    let matches = match &relation.original_relation_id {
        Some(original) => Some(record.external(original)?.fields == fields),
        None => None,
    };
    let action = after_relation_edit(relation.action, matches).inspect_err(|e| warn!(relation = %id, "{e}"))?;

    let relation = record.external_mut(id)?;
    relation.fields = fields;
    relation.action = Some(action);
    relation.updated = ctx.clock.now();
    Ok(relation.clone())
}

/// Deletes a staged internal relation: removed outright without an
/// original, tagged `Delete` with one.
///
/// # Errors
///
/// Returns [`Error::NotFound`] for unknown rows and [`Error::State`] for
/// rows outside the draft.
pub fn delete_internal(
    record: &mut CollectionRecord,
    ctx: &ServiceContext,
    id: &RelationId,
) -> Result<RelationDeleteOutcome<InternalRelation>> {
    let draft = record.require_draft()?;
    let relation = staged_internal(record, &draft, id)?;
    let has_original = relation
        .original_relation_id
        .as_ref()
        .is_some_and(|o| record.internal_relations.contains_key(o));

    match on_delete(relation.action, has_original)? {
        DeleteEffect::MarkDeleted => {
            let relation = record.internal_mut(id)?;
            relation.action = Some(Action::Delete);
            relation.updated = ctx.clock.now();
            Ok(RelationDeleteOutcome::MarkedDeleted(relation.clone()))
        }
        DeleteEffect::Remove | DeleteEffect::UnwindNewVersion => {
            record.internal_relations.remove(id);
            Ok(RelationDeleteOutcome::Removed)
        }
    }
}

/// Deletes a staged external relation: removed outright without an
/// original, tagged `Delete` with one.
///
/// # Errors
///
/// Returns [`Error::NotFound`] for unknown rows and [`Error::State`] for
/// rows outside the draft.
pub fn delete_external(
    record: &mut CollectionRecord,
    ctx: &ServiceContext,
    id: &RelationId,
) -> Result<RelationDeleteOutcome<ExternalRelation>> {
    let draft = record.require_draft()?;
    let relation = staged_external(record, &draft, id)?;
    let has_original = relation
        .original_relation_id
        .as_ref()
        .is_some_and(|o| record.external_relations.contains_key(o));

    match on_delete(relation.action, has_original)? {
        DeleteEffect::MarkDeleted => {
            let relation = record.external_mut(id)?;
            relation.action = Some(Action::Delete);
            relation.updated = ctx.clock.now();
            Ok(RelationDeleteOutcome::MarkedDeleted(relation.clone()))
        }
        DeleteEffect::Remove | DeleteEffect::UnwindNewVersion => {
            record.external_relations.remove(id);
            Ok(RelationDeleteOutcome::Removed)
        }
    }
}

/// Restores an internal relation tagged `Delete`, re-diffing it against its
/// original.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the original is gone and [`Error::State`]
/// unless the row is tagged `Delete`.
pub fn restore_internal(
    record: &mut CollectionRecord,
    ctx: &ServiceContext,
    id: &RelationId,
) -> Result<InternalRelation> {
    let draft = record.require_draft()?;
    let relation = staged_internal(record, &draft, id)?;
    let original = relation
        .original_relation_id
        .as_ref()
        .ok_or_else(|| Error::state(format!("relation {id} has no original")))?;
    let matches = internal_matches(record, original, &relation.fields)?;
    let action = on_restore(relation.action, matches)?;

    let relation = record.internal_mut(id)?;
    relation.action = Some(action);
    relation.updated = ctx.clock.now();
    Ok(relation.clone())
}

/// Restores an external relation tagged `Delete`, re-diffing it against its
/// original.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the original is gone and [`Error::State`]
/// unless the row is tagged `Delete`.
pub fn restore_external(
    record: &mut CollectionRecord,
    ctx: &ServiceContext,
    id: &RelationId,
) -> Result<ExternalRelation> {
    let draft = record.require_draft()?;
    let relation = staged_external(record, &draft, id)?;
    let original = relation
        .original_relation_id
        .as_ref()
        .ok_or_else(|| Error::state(format!("relation {id} has no original")))?;
    let matches = record.external(original)?.fields == relation.fields;
    let action = on_restore(relation.action, matches)?;

    let relation = record.external_mut(id)?;
    relation.action = Some(action);
    relation.updated = ctx.clock.now();
    Ok(relation.clone())
}

/// Tag after a relation field edit. `matches` is `None` for rows without an
/// original, otherwise whether the new fields equal the original's.
fn after_relation_edit(current: Option<Action>, matches: Option<bool>) -> Result<Action> {
    match (current, matches) {
        (Some(Action::Delete), _) => {
            Err(Error::state("relation is marked for deletion; restore it to edit"))
        }
        (_, None) => Ok(Action::Create),
        (_, Some(matches)) => Ok(rediff(matches)),
    }
}

/// The resource id a staged row will have once published. Clones, updates
/// and deletions stand for their original; everything else keeps its own id.
pub(crate) fn published_identity(record: &CollectionRecord, id: &ResourceId) -> ResourceId {
    record
        .resources
        .get(id)
        .filter(|r| matches!(r.action, Some(Action::Clone | Action::Update | Action::Delete)))
        .and_then(|r| r.original_resource_id.clone())
        .unwrap_or_else(|| id.clone())
}

fn internal_matches(
    record: &CollectionRecord,
    original: &RelationId,
    fields: &InternalFields,
) -> Result<bool> {
    let original = record.internal(original)?;
    let comparable = InternalFields {
        target_id: published_identity(record, &fields.target_id),
        ..fields.clone()
    };
    Ok(original.fields == comparable)
}

fn check_source(record: &CollectionRecord, draft: &VersionId, source: &ResourceId) -> Result<()> {
    let resource = record.staged_resource(draft, source)?;
    match resource.action {
        Some(action) if !action.survives_publish() => Err(Error::state(format!(
            "resource {source} is tagged {action}; its relations cannot change"
        ))),
        _ => Ok(()),
    }
}

fn check_target(
    record: &CollectionRecord,
    draft: &VersionId,
    source: &ResourceId,
    target: &ResourceId,
) -> Result<()> {
    if source == target {
        warn!(resource = %source, "rejected self-relation");
        return Err(Error::conflict(format!("resource {source} cannot relate to itself")));
    }
    match record.resources.get(target) {
        Some(resource) if resource.in_version(draft) => Ok(()),
        _ => Err(Error::not_found("resource in draft", target)),
    }
}

fn staged_internal<'r>(
    record: &'r CollectionRecord,
    draft: &VersionId,
    id: &RelationId,
) -> Result<&'r InternalRelation> {
    let relation = record.internal(id)?;
    if relation.versions.contains(draft) {
        Ok(relation)
    } else {
        Err(Error::state(format!("relation {id} belongs to a published version")))
    }
}

fn staged_external<'r>(
    record: &'r CollectionRecord,
    draft: &VersionId,
    id: &RelationId,
) -> Result<&'r ExternalRelation> {
    let relation = record.external(id)?;
    if relation.versions.contains(draft) {
        Ok(relation)
    } else {
        Err(Error::state(format!("relation {id} belongs to a published version")))
    }
}
