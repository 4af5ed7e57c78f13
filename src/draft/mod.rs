//! Draft lifecycle: find-or-create, clone-from-published, discard.
//!
//! A collection has at most one unpublished version at a time. Opening a
//! draft on a collection whose latest version is published deep-copies
//! every row of that version into staged rows tagged `Clone`, each pointing
//! back at the row it copies.

use std::collections::{BTreeSet, HashMap};

use tracing::{info, warn};

use crate::context::ServiceContext;
use crate::error::{Error, Result};
use crate::model::{
    Action, CollectionRecord, Creator, ExternalRelation, InternalRelation, RelationId, Resource,
    ResourceId, Version, VersionId, DRAFT_NAME,
};

/// Where a collection stands in the draft lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftState {
    /// The collection has no versions at all.
    NoVersion,
    /// Every version is published.
    PublishedOnly,
    /// An unpublished version exists.
    DraftExists,
}

/// The draft returned by [`get_or_create`].
#[derive(Debug, Clone, PartialEq)]
pub struct DraftOutcome {
    /// The draft version.
    pub version: Version,
    /// `true` if this call created it.
    pub created: bool,
}

/// Classifies the collection.
///
/// # Errors
///
/// Returns [`Error::Conflict`] if more than one unpublished version exists.
pub fn state(record: &CollectionRecord) -> Result<DraftState> {
    ensure_single_draft(record)?;
    Ok(if record.draft().is_some() {
        DraftState::DraftExists
    } else if record.versions.is_empty() {
        DraftState::NoVersion
    } else {
        DraftState::PublishedOnly
    })
}

/// Returns the collection's draft, creating it if necessary.
///
/// # Errors
///
/// Returns [`Error::Conflict`] when the single-draft invariant is found
/// broken, either up front or when re-checked just before creation.
pub fn get_or_create(record: &mut CollectionRecord, ctx: &ServiceContext) -> Result<DraftOutcome> {
    match state(record)? {
        DraftState::DraftExists => {
            let version = record.draft().cloned().ok_or_else(|| Error::state("draft vanished"))?;
            Ok(DraftOutcome { version, created: false })
        }
        DraftState::NoVersion => {
            let version = push_draft(record, ctx)?;
            info!(collection = %record.id(), draft = %version.id, "opened empty draft");
            Ok(DraftOutcome { version, created: true })
        }
        DraftState::PublishedOnly => {
            let source = record
                .latest_published()
                .map(|v| v.id.clone())
                .ok_or_else(|| Error::state("no published version to clone"))?;
            let version = push_draft(record, ctx)?;
            let copied = clone_rows(record, ctx, &source, &version.id)?;
            info!(
                collection = %record.id(),
                draft = %version.id,
                from = %source,
                resources = copied,
                "opened draft from published version"
            );
            Ok(DraftOutcome { version, created: true })
        }
    }
}

/// Discards the draft and every staged row in it.
///
/// The collection's working creator list is reset to the latest published
/// version's creators.
///
/// # Errors
///
/// Returns [`Error::State`] when there is no draft.
pub fn delete_draft(record: &mut CollectionRecord) -> Result<Version> {
    let draft_id = record.require_draft()?;

    let staged: Vec<ResourceId> = record.resources_in(&draft_id).map(|r| r.id.clone()).collect();
    for id in &staged {
        record.remove_resource(id);
    }
    // Relations are normally cascaded with their source; sweep any stragglers.
    record.internal_relations.retain(|_, r| !r.versions.contains(&draft_id));
    record.external_relations.retain(|_, r| !r.versions.contains(&draft_id));

    let position = record
        .versions
        .iter()
        .position(|v| v.id == draft_id)
        .ok_or_else(|| Error::not_found("version", &draft_id))?;
    let removed = record.versions.remove(position);

    if let Some(published) = record.latest_published() {
        record.collection.creators = published.creators.clone();
    }
    info!(collection = %record.id(), draft = %removed.id, rows = staged.len(), "discarded draft");
    Ok(removed)
}

/// Sets the release notes of the draft.
///
/// # Errors
///
/// Returns [`Error::NotFound`] for a collection with no versions and
/// [`Error::State`] when the latest version is already published.
pub fn set_changelog(record: &mut CollectionRecord, changelog: &str) -> Result<Version> {
    let collection = record.id().clone();
    let latest = record.versions.last_mut().ok_or_else(|| Error::not_found("version", collection))?;
    if latest.published {
        return Err(Error::state("cannot edit a published version"));
    }
    latest.changelog = Some(changelog.to_string());
    Ok(latest.clone())
}

/// Replaces the collection's working creator list.
///
/// # Errors
///
/// Returns [`Error::Validation`] listing every malformed creator.
pub fn set_creators(record: &mut CollectionRecord, creators: Vec<Creator>) -> Result<Vec<Creator>> {
    let creators = Creator::normalize_all(creators).map_err(Error::Validation)?;
    record.collection.creators.clone_from(&creators);
    Ok(creators)
}

fn ensure_single_draft(record: &CollectionRecord) -> Result<()> {
    let drafts = record.drafts().count();
    if drafts > 1 {
        warn!(collection = %record.id(), drafts, "single-draft invariant violated");
        return Err(Error::conflict(format!(
            "collection {} has {drafts} unpublished versions",
            record.id()
        )));
    }
    Ok(())
}

fn push_draft(record: &mut CollectionRecord, ctx: &ServiceContext) -> Result<Version> {
    if record.draft().is_some() {
        return Err(Error::conflict(format!(
            "collection {} already has an unpublished version",
            record.id()
        )));
    }
    let version = Version {
        id: VersionId::new(ctx.id_gen.generate_id()),
        collection_id: record.id().clone(),
        name: DRAFT_NAME.to_string(),
        identifier: ctx.id_gen.generate_label(),
        changelog: None,
        published: false,
        published_on: None,
        creators: Vec::new(),
        created: ctx.clock.now(),
    };
    record.versions.push(version.clone());
    Ok(version)
}

/// Copies every row of `source` into `draft`, tagged `Clone`. Returns the
/// number of resources copied.
fn clone_rows(
    record: &mut CollectionRecord,
    ctx: &ServiceContext,
    source: &VersionId,
    draft: &VersionId,
) -> Result<usize> {
    let now = ctx.clock.now();
    let in_draft = || BTreeSet::from([draft.clone()]);

    let mut staged_ids: HashMap<ResourceId, ResourceId> = HashMap::new();
    let resources: Vec<Resource> = record
        .resources_in(source)
        .map(|published| {
            let staged = Resource {
                id: ResourceId::new(ctx.id_gen.generate_id()),
                versions: in_draft(),
                fields: published.fields.clone(),
                filled_in: true,
                action: Some(Action::Clone),
                original_resource_id: Some(published.id.clone()),
                back_link_id: published.back_link_id.clone(),
                created: now,
                updated: now,
            };
            staged_ids.insert(published.id.clone(), staged.id.clone());
            staged
        })
        .collect();

    let staged_source = |source_id: &ResourceId, relation: &RelationId| {
        staged_ids.get(source_id).cloned().ok_or_else(|| {
            Error::conflict(format!("relation {relation} has no source in the published version"))
        })
    };

    let mut internal = Vec::new();
    for published in record.internal_in(source) {
        let mut fields = published.fields.clone();
        if let Some(target) = staged_ids.get(&fields.target_id) {
            fields.target_id = target.clone();
        }
        internal.push(InternalRelation {
            id: RelationId::new(ctx.id_gen.generate_id()),
            versions: in_draft(),
            source_id: staged_source(&published.source_id, &published.id)?,
            fields,
            action: Some(Action::Clone),
            original_relation_id: Some(published.id.clone()),
            mirror: published.mirror,
            created: now,
            updated: now,
        });
    }

    let mut external = Vec::new();
    for published in record.external_in(source) {
        external.push(ExternalRelation {
            id: RelationId::new(ctx.id_gen.generate_id()),
            versions: in_draft(),
            source_id: staged_source(&published.source_id, &published.id)?,
            fields: published.fields.clone(),
            action: Some(Action::Clone),
            original_relation_id: Some(published.id.clone()),
            created: now,
            updated: now,
        });
    }

    let copied = resources.len();
    record.resources.extend(resources.into_iter().map(|r| (r.id.clone(), r)));
    record.internal_relations.extend(internal.into_iter().map(|r| (r.id.clone(), r)));
    record.external_relations.extend(external.into_iter().map(|r| (r.id.clone(), r)));
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Collection, ExternalFields, InternalFields, ResourceFields};
    use crate::{publish, relations, tagging};
    use chrono::{TimeZone, Utc};

    fn ctx() -> ServiceContext {
        ServiceContext::in_memory(Utc.with_ymd_and_hms(2026, 6, 10, 9, 30, 0).unwrap())
    }

    fn empty_record(ctx: &ServiceContext) -> CollectionRecord {
        let now = ctx.clock.now();
        CollectionRecord::new(Collection {
            id: "c-1".into(),
            title: "Atlas".into(),
            description: String::new(),
            identifier: "atlas".into(),
            creators: Vec::new(),
            created: now,
            updated: now,
        })
    }

    fn fields(title: &str) -> ResourceFields {
        ResourceFields {
            title: title.into(),
            description: "d".into(),
            resource_type: "software".into(),
            identifier: title.to_lowercase(),
            identifier_type: "URL".into(),
            version_label: "1.0".into(),
        }
    }

    #[test]
    fn empty_collection_gets_an_empty_draft() {
        let ctx = ctx();
        let mut record = empty_record(&ctx);
        assert_eq!(state(&record).unwrap(), DraftState::NoVersion);

        let outcome = get_or_create(&mut record, &ctx).unwrap();
        assert!(outcome.created);
        assert_eq!(outcome.version.name, DRAFT_NAME);
        assert!(outcome.version.identifier.starts_with('v'));
        assert_eq!(record.resources.len(), 0);

        let again = get_or_create(&mut record, &ctx).unwrap();
        assert!(!again.created);
        assert_eq!(again.version.id, outcome.version.id);
        assert_eq!(record.versions.len(), 1);
    }

    #[test]
    fn published_rows_are_cloned_with_back_references() {
        let ctx = ctx();
        let mut record = empty_record(&ctx);
        get_or_create(&mut record, &ctx).unwrap();
        let a = tagging::add_resource(&mut record, &ctx, fields("A")).unwrap();
        let b = tagging::add_resource(&mut record, &ctx, fields("B")).unwrap();
        relations::add_internal(
            &mut record,
            &ctx,
            &a.id,
            InternalFields {
                target_id: b.id.clone(),
                relation_type: "References".into(),
                resource_type: "software".into(),
            },
        )
        .unwrap();
        relations::add_external(
            &mut record,
            &ctx,
            &a.id,
            ExternalFields {
                target: "https://doi.org/10.1/x".into(),
                target_type: "DOI".into(),
                relation_type: "Cites".into(),
                resource_type: "article".into(),
            },
        )
        .unwrap();
        publish::publish(&mut record, &ctx).unwrap();
        assert_eq!(state(&record).unwrap(), DraftState::PublishedOnly);

        let draft = get_or_create(&mut record, &ctx).unwrap().version;
        let staged: Vec<&Resource> = record.resources_in(&draft.id).collect();
        assert_eq!(staged.len(), 2);
        for row in &staged {
            assert_eq!(row.action, Some(Action::Clone));
            let original = record.resource(row.original_resource_id.as_ref().unwrap()).unwrap();
            assert_eq!(original.fields, row.fields);
        }

        let internal: Vec<&InternalRelation> = record.internal_in(&draft.id).collect();
        assert_eq!(internal.len(), 1);
        let staged_ids: Vec<&ResourceId> = staged.iter().map(|r| &r.id).collect();
        assert!(staged_ids.contains(&&internal[0].source_id));
        assert!(staged_ids.contains(&&internal[0].fields.target_id));
        assert_eq!(internal[0].action, Some(Action::Clone));
        assert_eq!(record.external_in(&draft.id).count(), 1);
    }

    #[test]
    fn a_second_unpublished_version_is_a_conflict() {
        let ctx = ctx();
        let mut record = empty_record(&ctx);
        let draft = get_or_create(&mut record, &ctx).unwrap().version;
        record.versions.push(Version { id: "rogue".into(), ..draft });
        assert!(matches!(get_or_create(&mut record, &ctx), Err(Error::Conflict(_))));
    }

    #[test]
    fn deleting_the_draft_removes_staged_rows_and_resets_creators() {
        let ctx = ctx();
        let mut record = empty_record(&ctx);
        get_or_create(&mut record, &ctx).unwrap();
        set_creators(&mut record, vec![Creator { given_name: "Ada".into(), ..Creator::default() }])
            .unwrap();
        tagging::add_resource(&mut record, &ctx, fields("A")).unwrap();
        publish::publish(&mut record, &ctx).unwrap();

        get_or_create(&mut record, &ctx).unwrap();
        set_creators(&mut record, vec![Creator { given_name: "Bob".into(), ..Creator::default() }])
            .unwrap();
        tagging::add_resource(&mut record, &ctx, fields("B")).unwrap();

        delete_draft(&mut record).unwrap();
        assert!(record.draft().is_none());
        assert_eq!(record.resources.len(), 1);
        assert_eq!(record.collection.creators[0].given_name, "Ada");
        assert!(matches!(delete_draft(&mut record), Err(Error::State(_))));
    }

    #[test]
    fn changelog_only_on_drafts() {
        let ctx = ctx();
        let mut record = empty_record(&ctx);
        assert!(matches!(set_changelog(&mut record, "x"), Err(Error::NotFound { .. })));
        get_or_create(&mut record, &ctx).unwrap();
        assert_eq!(set_changelog(&mut record, "First cut").unwrap().changelog.as_deref(), Some("First cut"));
        tagging::add_resource(&mut record, &ctx, fields("A")).unwrap();
        publish::publish(&mut record, &ctx).unwrap();
        assert!(matches!(set_changelog(&mut record, "late"), Err(Error::State(_))));
    }

    #[test]
    fn malformed_creators_are_rejected_as_a_batch() {
        let ctx = ctx();
        let mut record = empty_record(&ctx);
        let err = set_creators(
            &mut record,
            vec![Creator::default(), Creator { given_name: "X".into(), identifier: "i".into(), ..Creator::default() }],
        )
        .unwrap_err();
        assert_eq!(err.issues().len(), 2);
    }
}
