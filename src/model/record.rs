//! The per-collection document: a collection with all of its rows.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::collection::Collection;
use super::ids::{CollectionId, RelationId, ResourceId, VersionId};
use super::relation::{ExternalRelation, InternalRelation};
use super::resource::Resource;
use super::version::Version;
use crate::error::{Error, Result};

/// A collection together with every version and row that belongs to it.
///
/// This is the unit the store loads and commits atomically. Staged and
/// published rows share the same maps; a row's `versions` set and `action`
/// tell them apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionRecord {
    /// Bumped by the store on every commit.
    #[serde(default)]
    pub revision: u64,
    /// The collection itself.
    pub collection: Collection,
    /// Versions in creation order.
    #[serde(default)]
    pub versions: Vec<Version>,
    /// Resource rows keyed by id.
    #[serde(default)]
    pub resources: BTreeMap<ResourceId, Resource>,
    /// Internal relation rows keyed by id.
    #[serde(default)]
    pub internal_relations: BTreeMap<RelationId, InternalRelation>,
    /// External relation rows keyed by id.
    #[serde(default)]
    pub external_relations: BTreeMap<RelationId, ExternalRelation>,
}

impl CollectionRecord {
    /// Creates a record for a collection with no versions.
    #[must_use]
    pub fn new(collection: Collection) -> Self {
        Self {
            revision: 0,
            collection,
            versions: Vec::new(),
            resources: BTreeMap::new(),
            internal_relations: BTreeMap::new(),
            external_relations: BTreeMap::new(),
        }
    }

    /// The collection id.
    #[must_use]
    pub fn id(&self) -> &CollectionId {
        &self.collection.id
    }

    /// Iterates over unpublished versions.
    pub fn drafts(&self) -> impl Iterator<Item = &Version> {
        self.versions.iter().filter(|v| !v.published)
    }

    /// Returns the draft, if one exists.
    #[must_use]
    pub fn draft(&self) -> Option<&Version> {
        self.drafts().next()
    }

    /// Returns the draft's id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::State`] when the collection has no draft.
    pub fn require_draft(&self) -> Result<VersionId> {
        self.draft()
            .map(|v| v.id.clone())
            .ok_or_else(|| Error::state(format!("collection {} has no draft version", self.id())))
    }

    /// Returns the draft version mutably.
    ///
    /// # Errors
    ///
    /// Returns [`Error::State`] when the collection has no draft.
    pub fn draft_mut(&mut self) -> Result<&mut Version> {
        let id = self.collection.id.clone();
        self.versions
            .iter_mut()
            .find(|v| !v.published)
            .ok_or_else(|| Error::state(format!("collection {id} has no draft version")))
    }

    /// The most recently created version.
    #[must_use]
    pub fn latest_version(&self) -> Option<&Version> {
        self.versions.last()
    }

    /// The most recently published version.
    #[must_use]
    pub fn latest_published(&self) -> Option<&Version> {
        self.versions.iter().rev().find(|v| v.published)
    }

    /// Looks up a version by its public identifier.
    #[must_use]
    pub fn version_by_identifier(&self, identifier: &str) -> Option<&Version> {
        self.versions.iter().find(|v| v.identifier == identifier)
    }

    /// Looks up a resource row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such row exists.
    pub fn resource(&self, id: &ResourceId) -> Result<&Resource> {
        self.resources.get(id).ok_or_else(|| Error::not_found("resource", id))
    }

    /// Looks up a resource row mutably.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such row exists.
    pub fn resource_mut(&mut self, id: &ResourceId) -> Result<&mut Resource> {
        self.resources.get_mut(id).ok_or_else(|| Error::not_found("resource", id))
    }

    /// Looks up a resource row that must be staged in `draft`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for unknown ids and [`Error::State`] for
    /// rows that only belong to published versions.
    pub fn staged_resource(&self, draft: &VersionId, id: &ResourceId) -> Result<&Resource> {
        let resource = self.resource(id)?;
        if resource.in_version(draft) {
            Ok(resource)
        } else {
            Err(Error::state(format!("resource {id} belongs to a published version")))
        }
    }

    /// Resource rows belonging to `version`.
    pub fn resources_in<'a>(&'a self, version: &'a VersionId) -> impl Iterator<Item = &'a Resource> {
        self.resources.values().filter(move |r| r.in_version(version))
    }

    /// Internal relation rows belonging to `version`.
    pub fn internal_in<'a>(
        &'a self,
        version: &'a VersionId,
    ) -> impl Iterator<Item = &'a InternalRelation> {
        self.internal_relations.values().filter(move |r| r.versions.contains(version))
    }

    /// External relation rows belonging to `version`.
    pub fn external_in<'a>(
        &'a self,
        version: &'a VersionId,
    ) -> impl Iterator<Item = &'a ExternalRelation> {
        self.external_relations.values().filter(move |r| r.versions.contains(version))
    }

    /// Looks up an internal relation row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such row exists.
    pub fn internal(&self, id: &RelationId) -> Result<&InternalRelation> {
        self.internal_relations.get(id).ok_or_else(|| Error::not_found("internal relation", id))
    }

    /// Looks up an internal relation row mutably.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such row exists.
    pub fn internal_mut(&mut self, id: &RelationId) -> Result<&mut InternalRelation> {
        self.internal_relations.get_mut(id).ok_or_else(|| Error::not_found("internal relation", id))
    }

    /// Looks up an external relation row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such row exists.
    pub fn external(&self, id: &RelationId) -> Result<&ExternalRelation> {
        self.external_relations.get(id).ok_or_else(|| Error::not_found("external relation", id))
    }

    /// Looks up an external relation row mutably.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such row exists.
    pub fn external_mut(&mut self, id: &RelationId) -> Result<&mut ExternalRelation> {
        self.external_relations.get_mut(id).ok_or_else(|| Error::not_found("external relation", id))
    }

    /// Removes a resource row and every relation it owns.
    pub fn remove_resource(&mut self, id: &ResourceId) -> Option<Resource> {
        let removed = self.resources.remove(id)?;
        self.internal_relations.retain(|_, r| r.source_id != *id);
        self.external_relations.retain(|_, r| r.source_id != *id);
        Some(removed)
    }

    /// Marks the collection as modified. Called explicitly by every mutating
    /// operation before it commits.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.collection.updated = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InternalFields, ResourceFields};
    use chrono::TimeZone;
    use std::collections::BTreeSet;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    fn record() -> CollectionRecord {
        CollectionRecord::new(Collection {
            id: "c-1".into(),
            title: "Atlas".into(),
            description: String::new(),
            identifier: "atlas".into(),
            creators: Vec::new(),
            created: at(),
            updated: at(),
        })
    }

    fn resource(id: &str, version: &str) -> Resource {
        Resource {
            id: id.into(),
            versions: BTreeSet::from([VersionId::from(version)]),
            fields: ResourceFields::default(),
            filled_in: false,
            action: None,
            original_resource_id: None,
            back_link_id: None,
            created: at(),
            updated: at(),
        }
    }

    #[test]
    fn removing_a_resource_cascades_to_its_relations() {
        let mut rec = record();
        rec.resources.insert("r-1".into(), resource("r-1", "v-1"));
        rec.resources.insert("r-2".into(), resource("r-2", "v-1"));
        rec.internal_relations.insert(
            "rel-1".into(),
            InternalRelation {
                id: "rel-1".into(),
                versions: BTreeSet::from([VersionId::from("v-1")]),
                source_id: "r-1".into(),
                fields: InternalFields { target_id: "r-2".into(), ..InternalFields::default() },
                action: None,
                original_relation_id: None,
                mirror: false,
                created: at(),
                updated: at(),
            },
        );

        assert!(rec.remove_resource(&"r-1".into()).is_some());
        assert!(rec.internal_relations.is_empty());
        assert_eq!(rec.resources.len(), 1);
    }

    #[test]
    fn staged_lookup_rejects_published_rows() {
        let mut rec = record();
        rec.resources.insert("r-1".into(), resource("r-1", "v-published"));
        let err = rec.staged_resource(&"v-draft".into(), &"r-1".into()).unwrap_err();
        assert!(matches!(err, Error::State(_)));
        let err = rec.staged_resource(&"v-draft".into(), &"r-9".into()).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }
}
