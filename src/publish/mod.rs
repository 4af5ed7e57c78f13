//! Publishing: merging a draft into a new published version.
//!
//! Publishing runs in four phases over a working copy of the record:
//!
//! 1. **Resources.** Each staged row is resolved to its published identity.
//!    Clones reattach their original, updates overwrite it, new rows and new
//!    revisions are promoted in place, deleted and superseded rows are left
//!    out.
//! 2. **External relations**, then 3. **internal relations.** Each staged
//!    relation is handled according to [`disposition::of`], with sources and
//!    internal targets resolved through the [`identity::IdentityMap`].
//! 4. **Finalize.** Consumed staging rows are removed and the draft becomes
//!    the published version with the next calendar-version name.
//!
//! The caller's record is replaced only when every phase succeeds.

pub mod disposition;
pub mod identity;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::calver;
use crate::context::ServiceContext;
use crate::error::{Error, Result};
use crate::model::{
    Action, CollectionRecord, ExternalRelation, InternalRelation, RelationId, Resource, ResourceId,
    Version, VersionId,
};
use crate::tagging::check_original;
use crate::validate::validate;

use disposition::Disposition;
use identity::IdentityMap;

/// Tags of the draft's resources as they were before phase A promoted any.
type StagedTags = HashMap<ResourceId, Action>;

/// Publishes the collection's draft.
///
/// # Errors
///
/// - [`Error::State`] when there is no draft.
/// - [`Error::Conflict`] for more than one draft, a dangling relation
///   target, or rows in combinations no edit sequence produces.
/// - [`Error::Validation`] when the draft is incomplete.
/// - [`Error::NotFound`] when a staged row's original is missing.
///
/// On error `record` is left untouched.
pub fn publish(record: &mut CollectionRecord, ctx: &ServiceContext) -> Result<Version> {
    let draft = single_draft(record)?;
    let report = validate(record)?;
    if !report.valid {
        warn!(collection = %record.id(), issues = report.errors.len(), "publish blocked by validation");
        return Err(Error::Validation(report.errors));
    }

    let now = ctx.clock.now();
    let mut working = record.clone();
    let tags: StagedTags = working
        .resources_in(&draft)
        .filter_map(|r| r.action.map(|a| (r.id.clone(), a)))
        .collect();

    let identities = resolve_resources(&mut working, &draft, now)?;
    debug!(collection = %working.id(), surviving = identities.len(), "resources resolved");
    reconcile_external(&mut working, &draft, &tags, &identities, now)?;
    debug!(collection = %working.id(), "external relations reconciled");
    reconcile_internal(&mut working, &draft, &tags, &identities, now)?;
    debug!(collection = %working.id(), "internal relations reconciled");
    let version = finalize(&mut working, now)?;

    info!(collection = %working.id(), version = %version.name, "published");
    *record = working;
    Ok(version)
}

fn single_draft(record: &CollectionRecord) -> Result<VersionId> {
    let drafts: Vec<&Version> = record.drafts().collect();
    match drafts.as_slice() {
        [] => Err(Error::state(format!("collection {} has no draft to publish", record.id()))),
        [draft] => Ok(draft.id.clone()),
        many => Err(Error::conflict(format!(
            "collection {} has {} unpublished versions",
            record.id(),
            many.len()
        ))),
    }
}

/// Phase A.
fn resolve_resources(
    record: &mut CollectionRecord,
    draft: &VersionId,
    now: DateTime<Utc>,
) -> Result<IdentityMap> {
    let staged: Vec<Resource> = record.resources_in(draft).cloned().collect();
    let mut identities = IdentityMap::default();

    for row in &staged {
        let action = row
            .action
            .ok_or_else(|| Error::state(format!("staged resource {} carries no action", row.id)))?;
        check_original(Some(action), row.original_resource_id.is_some())?;

        match action {
            Action::Clone | Action::Update => {
                let original_id = row
                    .original_resource_id
                    .clone()
                    .ok_or_else(|| Error::state(format!("resource {} has no original", row.id)))?;
                let original = record
                    .resources
                    .get_mut(&original_id)
                    .ok_or_else(|| Error::not_found("original resource", &original_id))?;
                if action == Action::Update {
                    original.fields = row.fields.clone();
                    original.filled_in = true;
                    original.updated = now;
                }
                original.versions.insert(draft.clone());
                identities.insert(row.id.clone(), original_id);
            }
            Action::NewVersion => {
                let prior = identity::prior_published(record, row)?;
                let promoted = record.resource_mut(&row.id)?;
                promoted.back_link_id = Some(prior);
                promoted.original_resource_id = None;
                promote(promoted, now);
                identities.insert(row.id.clone(), row.id.clone());
            }
            Action::Create => {
                promote(record.resource_mut(&row.id)?, now);
                identities.insert(row.id.clone(), row.id.clone());
            }
            Action::Delete | Action::OldVersion => {}
        }
    }
    Ok(identities)
}

fn promote(resource: &mut Resource, now: DateTime<Utc>) {
    resource.action = None;
    resource.filled_in = true;
    resource.updated = now;
}

/// Phase B.
fn reconcile_external(
    record: &mut CollectionRecord,
    draft: &VersionId,
    tags: &StagedTags,
    identities: &IdentityMap,
    now: DateTime<Utc>,
) -> Result<()> {
    let staged: Vec<ExternalRelation> = record.external_in(draft).cloned().collect();
    for row in &staged {
        let owner = tags.get(&row.source_id).copied();
        match relation_disposition(row.action, owner, &row.id)? {
            disposition @ (Disposition::Carry | Disposition::Rewrite) => {
                let original_id = original_relation(row.original_relation_id.as_ref(), &row.id)?;
                let original = record.external_mut(original_id)?;
                if disposition == Disposition::Rewrite {
                    original.fields = row.fields.clone();
                    original.updated = now;
                }
                original.versions.insert(draft.clone());
            }
            Disposition::Drop => {
                record.external(original_relation(row.original_relation_id.as_ref(), &row.id)?)?;
            }
            Disposition::Insert => {
                let source = identities.source(&row.source_id)?;
                let promoted = record.external_mut(&row.id)?;
                promoted.source_id = source;
                promoted.action = None;
                promoted.updated = now;
            }
            Disposition::Discard => {}
        }
    }
    Ok(())
}

/// Phase C. Like phase B, with targets resolved through the identity map.
fn reconcile_internal(
    record: &mut CollectionRecord,
    draft: &VersionId,
    tags: &StagedTags,
    identities: &IdentityMap,
    now: DateTime<Utc>,
) -> Result<()> {
    let staged: Vec<InternalRelation> = record.internal_in(draft).cloned().collect();
    for row in &staged {
        let owner = tags.get(&row.source_id).copied();
        let disposition = relation_disposition(row.action, owner, &row.id)?;
        if disposition == Disposition::Discard {
            continue;
        }
        if disposition == Disposition::Drop {
            record.internal(original_relation(row.original_relation_id.as_ref(), &row.id)?)?;
            continue;
        }

        let target = identities.target(&row.fields.target_id).inspect_err(|_| {
            warn!(relation = %row.id, target = %row.fields.target_id, "dangling relation target");
        })?;

        let original_id = row.original_relation_id.clone();
        let original_target = match (disposition, &original_id) {
            (Disposition::Carry | Disposition::Rewrite, Some(id)) => {
                Some(record.internal(id)?.fields.target_id.clone())
            }
            _ => None,
        };

        match disposition {
            // The target was revised in this draft: the original keeps
            // pointing at the old revision for earlier versions and the
            // staged row is published as a new relation.
            Disposition::Carry | Disposition::Rewrite if original_target.as_ref() != Some(&target) => {
                debug!(relation = %row.id, "target revised; publishing relation as new");
                promote_internal(record, row, identities, target, now)?;
            }
            Disposition::Carry | Disposition::Rewrite => {
                let original_id = original_relation(original_id.as_ref(), &row.id)?;
                let original = record.internal_mut(original_id)?;
                if disposition == Disposition::Rewrite {
                    original.fields = row.fields.clone();
                    original.fields.target_id = target;
                    original.updated = now;
                }
                original.versions.insert(draft.clone());
            }
            Disposition::Insert => promote_internal(record, row, identities, target, now)?,
            Disposition::Drop | Disposition::Discard => {}
        }
    }
    Ok(())
}

fn promote_internal(
    record: &mut CollectionRecord,
    row: &InternalRelation,
    identities: &IdentityMap,
    target: ResourceId,
    now: DateTime<Utc>,
) -> Result<()> {
    let source = identities.source(&row.source_id)?;
    let promoted = record.internal_mut(&row.id)?;
    promoted.source_id = source;
    promoted.fields.target_id = target;
    promoted.action = None;
    promoted.original_relation_id = None;
    promoted.updated = now;
    Ok(())
}

fn relation_disposition(
    relation: Option<Action>,
    owner: Option<Action>,
    id: &RelationId,
) -> Result<Disposition> {
    if let Some(tag) = relation.filter(|a| !a.is_relation_action()) {
        return Err(Error::state(format!("relation {id} carries the resource-only tag {tag}")));
    }
    disposition::of(relation, owner).ok_or_else(|| {
        let tag = |a: Option<Action>| a.map_or_else(|| "none".to_string(), |a| a.to_string());
        Error::conflict(format!(
            "relation {id} tagged {} under a resource tagged {}",
            tag(relation),
            tag(owner)
        ))
    })
}

fn original_relation<'r>(original: Option<&'r RelationId>, id: &RelationId) -> Result<&'r RelationId> {
    original.ok_or_else(|| Error::state(format!("relation {id} has no original")))
}

/// Phase D.
fn finalize(record: &mut CollectionRecord, now: DateTime<Utc>) -> Result<Version> {
    let draft = record.require_draft()?;
    record.resources.retain(|_, r| r.action.is_none() || !r.in_version(&draft));
    record.internal_relations.retain(|_, r| r.action.is_none() || !r.versions.contains(&draft));
    record.external_relations.retain(|_, r| r.action.is_none() || !r.versions.contains(&draft));

    let previous = record.latest_published().map(|v| v.name.clone());
    let creators = record.collection.creators.clone();
    let version = record.draft_mut()?;
    version.published = true;
    version.published_on = Some(now);
    version.name = calver::increment(previous.as_deref(), now);
    version.creators = creators;
    Ok(version.clone())
}
