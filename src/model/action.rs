//! Per-row action tags carried by staged resources and relations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What publishing should do with a staged row.
///
/// Published rows carry no action. Every tag except [`Action::Create`]
/// implies the row references an original published row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    /// A row that did not exist in the last published version.
    Create,
    /// A copy of a published row whose content differs from the original.
    Update,
    /// An unmodified copy of a published row.
    Clone,
    /// A published row scheduled for removal from the next version.
    Delete,
    /// The head of a new resource revision chain.
    NewVersion,
    /// A row superseded by a [`Action::NewVersion`] row.
    OldVersion,
}

impl Action {
    /// Returns `true` if rows with this tag must reference an original row.
    #[must_use]
    pub fn requires_original(self) -> bool {
        !matches!(self, Self::Create)
    }

    /// Returns `true` if the tag is meaningful on a relation row.
    #[must_use]
    pub fn is_relation_action(self) -> bool {
        matches!(self, Self::Create | Self::Update | Self::Clone | Self::Delete)
    }

    /// Returns `true` if a row with this tag will be part of the next version.
    #[must_use]
    pub fn survives_publish(self) -> bool {
        !matches!(self, Self::Delete | Self::OldVersion)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Clone => "clone",
            Self::Delete => "delete",
            Self::NewVersion => "newVersion",
            Self::OldVersion => "oldVersion",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_create_lacks_an_original() {
        assert!(!Action::Create.requires_original());
        for action in
            [Action::Update, Action::Clone, Action::Delete, Action::NewVersion, Action::OldVersion]
        {
            assert!(action.requires_original(), "{action} should require an original");
        }
    }

    #[test]
    fn revision_tags_belong_to_resources_only() {
        assert!(!Action::NewVersion.is_relation_action());
        assert!(!Action::OldVersion.is_relation_action());
        for action in [Action::Create, Action::Update, Action::Clone, Action::Delete] {
            assert!(action.is_relation_action(), "{action} should be a relation tag");
        }
    }

    #[test]
    fn serializes_camel_case() {
        assert_eq!(serde_yaml::to_string(&Action::NewVersion).unwrap().trim(), "newVersion");
        let parsed: Action = serde_yaml::from_str("oldVersion").unwrap();
        assert_eq!(parsed, Action::OldVersion);
    }
}
