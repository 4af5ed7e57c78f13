//! Versions of a collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::creator::Creator;
use super::ids::{CollectionId, VersionId};

/// Label carried by a version until it is published.
pub const DRAFT_NAME: &str = "Draft";

/// One version of a collection: the single editable draft, or an immutable
/// published snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    /// Version identifier.
    pub id: VersionId,
    /// Owning collection.
    pub collection_id: CollectionId,
    /// Calendar-version label once published, [`DRAFT_NAME`] before.
    pub name: String,
    /// Public, human-readable identifier (`v` followed by eight characters).
    pub identifier: String,
    /// Release notes written while drafting.
    #[serde(default)]
    pub changelog: Option<String>,
    /// Whether this version is published.
    pub published: bool,
    /// When the version was published.
    #[serde(default)]
    pub published_on: Option<DateTime<Utc>>,
    /// Creators as they stood when the version was published.
    #[serde(default)]
    pub creators: Vec<Creator>,
    /// Creation timestamp.
    pub created: DateTime<Utc>,
}
