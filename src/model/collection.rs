//! The collection, root of a version lineage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::creator::Creator;
use super::ids::CollectionId;

/// A collection of resources published as a sequence of versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    /// Collection identifier.
    pub id: CollectionId,
    /// Display title.
    pub title: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Public, human-readable identifier.
    pub identifier: String,
    /// Working copy of the creator list; snapshotted into each published version.
    #[serde(default)]
    pub creators: Vec<Creator>,
    /// Creation timestamp.
    pub created: DateTime<Utc>,
    /// Bumped after every mutation of the collection or its draft.
    pub updated: DateTime<Utc>,
}
