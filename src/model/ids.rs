//! Opaque identifier newtypes.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a raw identifier string.
            #[must_use]
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self(raw.to_string())
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self(raw)
            }
        }
    };
}

id_type!(
    /// Identifies a collection, the root of one version lineage.
    CollectionId
);
id_type!(
    /// Identifies a version (draft or published).
    VersionId
);
id_type!(
    /// Identifies a resource row, staged or published.
    ResourceId
);
id_type!(
    /// Identifies an internal or external relation row.
    RelationId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = ResourceId::new("res-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"res-1\"");
        let back: ResourceId = serde_json::from_str("\"res-1\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn default_id_is_empty() {
        assert_eq!(ResourceId::default().as_str(), "");
        let fields = crate::model::InternalFields::default();
        assert_eq!(fields.target_id, ResourceId::new(""));
    }
}
