//! The core operations, each run as one locked transaction on one
//! collection.
//!
//! Every mutating operation takes the collection's lock, loads the record
//! into a [`Transaction`](crate::store::Transaction), applies the change,
//! touches the collection, and commits. An error anywhere drops the
//! transaction and leaves the stored record as it was.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::context::ServiceContext;
use crate::draft::{self, DraftOutcome};
use crate::error::{Error, Result};
use crate::model::{
    Collection, CollectionId, CollectionRecord, Creator, ExternalFields, ExternalRelation,
    InternalFields, InternalRelation, RelationId, Resource, ResourceFields, ResourceId,
    ResourcePatch, Version,
};
use crate::publish;
use crate::relations::{self, RelationDeleteOutcome};
use crate::store::{CollectionLocks, CollectionStore};
use crate::tagging::{self, DeleteOutcome};
use crate::validate::{self, ValidationReport};

/// Read-only view of one version: the version and every row in it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionSnapshot {
    /// The version.
    pub version: Version,
    /// Its resources.
    pub resources: Vec<Resource>,
    /// Its internal relations.
    pub internal_relations: Vec<InternalRelation>,
    /// Its external relations.
    pub external_relations: Vec<ExternalRelation>,
}

/// Entry point for callers such as the CLI.
pub struct Engine {
    ctx: ServiceContext,
    root: PathBuf,
    locks: CollectionLocks,
}

impl Engine {
    /// Creates an engine over the store at `root`.
    #[must_use]
    pub fn new(ctx: ServiceContext, root: &Path) -> Self {
        Self { ctx, root: root.to_path_buf(), locks: CollectionLocks::new() }
    }

    /// The service context the engine runs with.
    #[must_use]
    pub fn context(&self) -> &ServiceContext {
        &self.ctx
    }

    fn store(&self) -> CollectionStore<'_> {
        CollectionStore::new(&self.ctx, &self.root)
    }

    /// Runs `op` on a transaction over `id` and commits the result.
    fn mutate<T>(
        &self,
        id: &CollectionId,
        operation: &'static str,
        op: impl FnOnce(&mut CollectionRecord, &ServiceContext) -> Result<T>,
    ) -> Result<T> {
        self.locks.with(id, || {
            let store = self.store();
            let mut tx = store.begin(id)?;
            let out = op(tx.record_mut(), &self.ctx).inspect_err(|e| {
                warn!(collection = %id, operation, error = %e, "operation rejected");
            })?;
            tx.record_mut().touch(self.ctx.clock.now());
            let committed = tx.commit()?;
            info!(collection = %id, operation, revision = committed.revision, "operation applied");
            Ok(out)
        })
    }

    fn read<T>(&self, id: &CollectionId, op: impl FnOnce(&CollectionRecord) -> Result<T>) -> Result<T> {
        op(&self.store().load(id)?)
    }

    // Collections

    /// Creates a collection with no versions.
    ///
    /// # Errors
    ///
    /// Returns a store error if the record cannot be written.
    pub fn create_collection(&self, title: &str, description: &str) -> Result<Collection> {
        let now = self.ctx.clock.now();
        let collection = Collection {
            id: CollectionId::new(self.ctx.id_gen.generate_id()),
            title: title.to_string(),
            description: description.to_string(),
            identifier: self.ctx.id_gen.generate_label(),
            creators: Vec::new(),
            created: now,
            updated: now,
        };
        self.store().create(&CollectionRecord::new(collection.clone()))?;
        info!(collection = %collection.id, "collection created");
        Ok(collection)
    }

    /// Lists every collection, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns a store error if any record cannot be read.
    pub fn list_collections(&self) -> Result<Vec<Collection>> {
        let store = self.store();
        let mut collections = store
            .list()?
            .iter()
            .map(|id| store.load(id).map(|record| record.collection))
            .collect::<Result<Vec<_>>>()?;
        collections.sort_by(|a, b| b.updated.cmp(&a.updated));
        Ok(collections)
    }

    /// Loads the full record of a collection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for unknown collections.
    pub fn record(&self, id: &CollectionId) -> Result<CollectionRecord> {
        self.read(id, |record| Ok(record.clone()))
    }

    // Drafts

    /// Returns the draft, cloning the latest published version if needed.
    ///
    /// # Errors
    ///
    /// See [`draft::get_or_create`].
    pub fn get_or_create_draft(&self, id: &CollectionId) -> Result<DraftOutcome> {
        self.mutate(id, "get_or_create_draft", draft::get_or_create)
    }

    /// Discards the draft.
    ///
    /// # Errors
    ///
    /// See [`draft::delete_draft`].
    pub fn delete_draft(&self, id: &CollectionId) -> Result<Version> {
        self.mutate(id, "delete_draft", |record, _| draft::delete_draft(record))
    }

    /// Sets the draft's changelog.
    ///
    /// # Errors
    ///
    /// See [`draft::set_changelog`].
    pub fn set_changelog(&self, id: &CollectionId, changelog: &str) -> Result<Version> {
        self.mutate(id, "set_changelog", |record, _| draft::set_changelog(record, changelog))
    }

    /// Replaces the collection's creators.
    ///
    /// # Errors
    ///
    /// See [`draft::set_creators`].
    pub fn set_creators(&self, id: &CollectionId, creators: Vec<Creator>) -> Result<Vec<Creator>> {
        self.mutate(id, "set_creators", |record, _| draft::set_creators(record, creators))
    }

    // Resources

    /// Adds a resource to the draft.
    ///
    /// # Errors
    ///
    /// See [`tagging::add_resource`].
    pub fn add_resource(&self, id: &CollectionId, fields: ResourceFields) -> Result<Resource> {
        self.mutate(id, "add_resource", |record, ctx| tagging::add_resource(record, ctx, fields))
    }

    /// Applies a field patch to a staged resource.
    ///
    /// # Errors
    ///
    /// See [`tagging::edit_resource`].
    pub fn edit_resource(
        &self,
        id: &CollectionId,
        resource: &ResourceId,
        patch: &ResourcePatch,
    ) -> Result<Resource> {
        self.mutate(id, "edit_resource", |record, ctx| {
            tagging::edit_resource(record, ctx, resource, patch)
        })
    }

    /// Deletes a staged resource.
    ///
    /// # Errors
    ///
    /// See [`tagging::delete_resource`].
    pub fn delete_resource(&self, id: &CollectionId, resource: &ResourceId) -> Result<DeleteOutcome> {
        self.mutate(id, "delete_resource", |record, ctx| {
            tagging::delete_resource(record, ctx, resource)
        })
    }

    /// Restores a deleted resource.
    ///
    /// # Errors
    ///
    /// See [`tagging::restore_resource`].
    pub fn restore_resource(&self, id: &CollectionId, resource: &ResourceId) -> Result<Resource> {
        self.mutate(id, "restore_resource", |record, ctx| {
            tagging::restore_resource(record, ctx, resource)
        })
    }

    /// Starts a new revision of a staged resource.
    ///
    /// # Errors
    ///
    /// See [`tagging::start_new_version`].
    pub fn start_new_version(&self, id: &CollectionId, resource: &ResourceId) -> Result<Resource> {
        self.mutate(id, "start_new_version", |record, ctx| {
            tagging::start_new_version(record, ctx, resource)
        })
    }

    /// Drops a new revision and restores its predecessor.
    ///
    /// # Errors
    ///
    /// See [`tagging::restore_from_new_version`].
    pub fn restore_from_new_version(
        &self,
        id: &CollectionId,
        resource: &ResourceId,
    ) -> Result<Resource> {
        self.mutate(id, "restore_from_new_version", |record, ctx| {
            tagging::restore_from_new_version(record, ctx, resource)
        })
    }

    // Relations

    /// Adds an internal relation.
    ///
    /// # Errors
    ///
    /// See [`relations::add_internal`].
    pub fn add_internal_relation(
        &self,
        id: &CollectionId,
        source: &ResourceId,
        fields: InternalFields,
    ) -> Result<InternalRelation> {
        self.mutate(id, "add_internal_relation", |record, ctx| {
            relations::add_internal(record, ctx, source, fields)
        })
    }

    /// Adds an external relation.
    ///
    /// # Errors
    ///
    /// See [`relations::add_external`].
    pub fn add_external_relation(
        &self,
        id: &CollectionId,
        source: &ResourceId,
        fields: ExternalFields,
    ) -> Result<ExternalRelation> {
        self.mutate(id, "add_external_relation", |record, ctx| {
            relations::add_external(record, ctx, source, fields)
        })
    }

    /// Edits an internal relation.
    ///
    /// # Errors
    ///
    /// See [`relations::edit_internal`].
    pub fn edit_internal_relation(
        &self,
        id: &CollectionId,
        relation: &RelationId,
        fields: InternalFields,
    ) -> Result<InternalRelation> {
        self.mutate(id, "edit_internal_relation", |record, ctx| {
            relations::edit_internal(record, ctx, relation, fields)
        })
    }

    /// Edits an external relation.
    ///
    /// # Errors
    ///
    /// See [`relations::edit_external`].
    pub fn edit_external_relation(
        &self,
        id: &CollectionId,
        relation: &RelationId,
        fields: ExternalFields,
    ) -> Result<ExternalRelation> {
        self.mutate(id, "edit_external_relation", |record, ctx| {
            relations::edit_external(record, ctx, relation, fields)
        })
    }

    /// Deletes an internal relation.
    ///
    /// # Errors
    ///
    /// See [`relations::delete_internal`].
    pub fn delete_internal_relation(
        &self,
        id: &CollectionId,
        relation: &RelationId,
    ) -> Result<RelationDeleteOutcome<InternalRelation>> {
        self.mutate(id, "delete_internal_relation", |record, ctx| {
            relations::delete_internal(record, ctx, relation)
        })
    }

    /// Deletes an external relation.
    ///
    /// # Errors
    ///
    /// See [`relations::delete_external`].
    pub fn delete_external_relation(
        &self,
        id: &CollectionId,
        relation: &RelationId,
    ) -> Result<RelationDeleteOutcome<ExternalRelation>> {
        self.mutate(id, "delete_external_relation", |record, ctx| {
            relations::delete_external(record, ctx, relation)
        })
    }

    /// Restores an internal relation.
    ///
    /// # Errors
    ///
    /// See [`relations::restore_internal`].
    pub fn restore_internal_relation(
        &self,
        id: &CollectionId,
        relation: &RelationId,
    ) -> Result<InternalRelation> {
        self.mutate(id, "restore_internal_relation", |record, ctx| {
            relations::restore_internal(record, ctx, relation)
        })
    }

    /// Restores an external relation.
    ///
    /// # Errors
    ///
    /// See [`relations::restore_external`].
    pub fn restore_external_relation(
        &self,
        id: &CollectionId,
        relation: &RelationId,
    ) -> Result<ExternalRelation> {
        self.mutate(id, "restore_external_relation", |record, ctx| {
            relations::restore_external(record, ctx, relation)
        })
    }

    // Validate and publish

    /// Validates the draft.
    ///
    /// # Errors
    ///
    /// See [`validate::validate`].
    pub fn validate(&self, id: &CollectionId) -> Result<ValidationReport> {
        self.read(id, validate::validate)
    }

    /// Publishes the draft.
    ///
    /// # Errors
    ///
    /// See [`publish::publish`].
    pub fn publish(&self, id: &CollectionId) -> Result<Version> {
        self.mutate(id, "publish", publish::publish)
    }

    // Versions

    /// Lists a collection's versions in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for unknown collections.
    pub fn list_versions(&self, id: &CollectionId) -> Result<Vec<Version>> {
        self.read(id, |record| Ok(record.versions.clone()))
    }

    /// Returns one version with its rows. Without an identifier, the latest
    /// version (draft or published) is returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for unknown collections or versions.
    pub fn version_snapshot(
        &self,
        id: &CollectionId,
        identifier: Option<&str>,
    ) -> Result<VersionSnapshot> {
        self.read(id, |record| {
            let version = match identifier {
                Some(identifier) => record
                    .version_by_identifier(identifier)
                    .ok_or_else(|| Error::not_found("version", identifier))?,
                None => record.latest_version().ok_or_else(|| Error::not_found("version", id))?,
            };
            Ok(VersionSnapshot {
                version: version.clone(),
                resources: record.resources_in(&version.id).cloned().collect(),
                internal_relations: record.internal_in(&version.id).cloned().collect(),
                external_relations: record.external_in(&version.id).cloned().collect(),
            })
        })
    }
}
