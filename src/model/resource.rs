//! Resource rows and their editable content.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::action::Action;
use super::ids::{ResourceId, VersionId};

/// The user-editable content of a resource.
///
/// Two rows "have the same content" exactly when their `ResourceFields`
/// are equal; restore and publish diffs compare this struct as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceFields {
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Kind of resource (e.g. "dataset", "software").
    #[serde(default)]
    pub resource_type: String,
    /// Persistent identifier or link target.
    #[serde(default)]
    pub identifier: String,
    /// Scheme of `identifier` (e.g. "DOI", "URL").
    #[serde(default)]
    pub identifier_type: String,
    /// Author-facing version label of the resource itself.
    #[serde(default)]
    pub version_label: String,
}

impl ResourceFields {
    /// Returns `true` when every required field is non-empty.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        [&self.title, &self.description, &self.resource_type, &self.identifier, &self.identifier_type]
            .iter()
            .all(|value| !value.trim().is_empty())
    }
}

/// A partial edit to [`ResourceFields`]. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePatch {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// New resource type.
    #[serde(default)]
    pub resource_type: Option<String>,
    /// New identifier.
    #[serde(default)]
    pub identifier: Option<String>,
    /// New identifier type.
    #[serde(default)]
    pub identifier_type: Option<String>,
    /// New version label.
    #[serde(default)]
    pub version_label: Option<String>,
}

impl ResourcePatch {
    /// Returns `true` if the patch sets no field at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the patch to `fields` in place.
    pub fn apply(&self, fields: &mut ResourceFields) {
        let pairs = [
            (&self.title, &mut fields.title),
            (&self.description, &mut fields.description),
            (&self.resource_type, &mut fields.resource_type),
            (&self.identifier, &mut fields.identifier),
            (&self.identifier_type, &mut fields.identifier_type),
            (&self.version_label, &mut fields.version_label),
        ];
        for (value, slot) in pairs {
            if let Some(value) = value {
                slot.clone_from(value);
            }
        }
    }
}

/// A resource row, either staged in a draft or part of published versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Row identifier.
    pub id: ResourceId,
    /// Versions this row belongs to. Staged rows belong to the draft only.
    #[serde(default)]
    pub versions: BTreeSet<VersionId>,
    /// Editable content.
    #[serde(flatten)]
    pub fields: ResourceFields,
    /// Whether the author has completed the required fields.
    #[serde(default)]
    pub filled_in: bool,
    /// Staging tag; `None` on published rows.
    #[serde(default)]
    pub action: Option<Action>,
    /// The published row this staged row stands for.
    #[serde(default)]
    pub original_resource_id: Option<ResourceId>,
    /// The preceding revision of this resource.
    #[serde(default)]
    pub back_link_id: Option<ResourceId>,
    /// Creation timestamp.
    pub created: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated: DateTime<Utc>,
}

impl Resource {
    /// Returns `true` if the row belongs to `version`.
    #[must_use]
    pub fn in_version(&self, version: &VersionId) -> bool {
        self.versions.contains(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ResourceFields {
        ResourceFields {
            title: "Survey data".into(),
            description: "Raw responses".into(),
            resource_type: "dataset".into(),
            identifier: "10.1234/abc".into(),
            identifier_type: "DOI".into(),
            version_label: "v1".into(),
        }
    }

    #[test]
    fn complete_fields_ignore_version_label() {
        let mut fields = complete();
        fields.version_label.clear();
        assert!(fields.is_complete());
        fields.identifier = "  ".into();
        assert!(!fields.is_complete());
    }

    #[test]
    fn patch_only_touches_set_fields() {
        let mut fields = complete();
        let patch = ResourcePatch { title: Some("Renamed".into()), ..ResourcePatch::default() };
        patch.apply(&mut fields);
        assert_eq!(fields.title, "Renamed");
        assert_eq!(fields.description, "Raw responses");
        assert!(!patch.is_empty());
        assert!(ResourcePatch::default().is_empty());
    }
}
