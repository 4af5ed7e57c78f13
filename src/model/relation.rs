//! Internal and external relation rows.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::action::Action;
use super::ids::{RelationId, ResourceId, VersionId};

/// Editable content of a relation between two resources of one collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalFields {
    /// The resource the relation points at.
    pub target_id: ResourceId,
    /// Relation type (e.g. "IsPartOf").
    #[serde(rename = "type", default)]
    pub relation_type: String,
    /// Resource type of the target as seen from the relation.
    #[serde(default)]
    pub resource_type: String,
}

/// Editable content of a relation to something outside the collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalFields {
    /// Opaque external target (URI, DOI, ...).
    pub target: String,
    /// Scheme of `target`.
    #[serde(default)]
    pub target_type: String,
    /// Relation type (e.g. "Cites").
    #[serde(rename = "type", default)]
    pub relation_type: String,
    /// Resource type of the target.
    #[serde(default)]
    pub resource_type: String,
}

/// A relation from a resource to another resource of the same collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternalRelation {
    /// Row identifier.
    pub id: RelationId,
    /// Versions this row belongs to.
    #[serde(default)]
    pub versions: BTreeSet<VersionId>,
    /// Owning resource.
    pub source_id: ResourceId,
    /// Editable content.
    #[serde(flatten)]
    pub fields: InternalFields,
    /// Staging tag; `None` on published rows.
    #[serde(default)]
    pub action: Option<Action>,
    /// The published relation this staged row stands for.
    #[serde(default)]
    pub original_relation_id: Option<RelationId>,
    /// Marks an auto-generated inverse relation.
    #[serde(default)]
    pub mirror: bool,
    /// Creation timestamp.
    pub created: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated: DateTime<Utc>,
}

/// A relation from a resource to an external target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalRelation {
    /// Row identifier.
    pub id: RelationId,
    /// Versions this row belongs to.
    #[serde(default)]
    pub versions: BTreeSet<VersionId>,
    /// Owning resource.
    pub source_id: ResourceId,
    /// Editable content.
    #[serde(flatten)]
    pub fields: ExternalFields,
    /// Staging tag; `None` on published rows.
    #[serde(default)]
    pub action: Option<Action>,
    /// The published relation this staged row stands for.
    #[serde(default)]
    pub original_relation_id: Option<RelationId>,
    /// Creation timestamp.
    pub created: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated: DateTime<Utc>,
}
