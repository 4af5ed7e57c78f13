//! Relation-type vocabulary and inverse lookup.
//!
//! Relation rows store their type as free text; this vocabulary names the
//! well-known values and pairs each with its inverse. Nothing creates
//! inverse relations automatically: callers that want one must add it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! relation_types {
    ($($variant:ident => $mirror:expr),+ $(,)?) => {
        /// A well-known relation type.
        #[allow(missing_docs)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum RelationType {
            $($variant),+
        }

        impl RelationType {
            /// Every known relation type.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Returns the type's wire name.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),+
                }
            }

            /// Returns the inverse type, if the relation has one.
            #[must_use]
            pub fn mirror(self) -> Option<Self> {
                match self {
                    $(Self::$variant => $mirror),+
                }
            }
        }

        impl FromStr for RelationType {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $(stringify!($variant) => Ok(Self::$variant),)+
                    other => Err(format!("unknown relation type: {other}")),
                }
            }
        }
    };
}

relation_types! {
    IsCitedBy => Some(Self::Cites),
    Cites => Some(Self::IsCitedBy),
    IsSupplementTo => Some(Self::IsSupplementedBy),
    IsSupplementedBy => Some(Self::IsSupplementTo),
    IsContinuedBy => Some(Self::Continues),
    Continues => Some(Self::IsContinuedBy),
    Describes => Some(Self::IsDescribedBy),
    IsDescribedBy => Some(Self::Describes),
    HasMetadata => Some(Self::IsMetadataFor),
    IsMetadataFor => Some(Self::HasMetadata),
    HasVersion => Some(Self::IsVersionOf),
    IsVersionOf => Some(Self::HasVersion),
    IsNewVersionOf => Some(Self::IsPreviousVersionOf),
    IsPreviousVersionOf => Some(Self::IsNewVersionOf),
    IsPartOf => Some(Self::HasPart),
    HasPart => Some(Self::IsPartOf),
    IsPublishedIn => None,
    IsReferencedBy => Some(Self::References),
    References => Some(Self::IsReferencedBy),
    IsDocumentedBy => Some(Self::Documents),
    Documents => Some(Self::IsDocumentedBy),
    IsCompiledBy => Some(Self::Compiles),
    Compiles => Some(Self::IsCompiledBy),
    IsVariantFormOf => Some(Self::IsOriginalFormOf),
    IsOriginalFormOf => Some(Self::IsVariantFormOf),
    IsIdenticalTo => Some(Self::IsIdenticalTo),
    IsReviewedBy => Some(Self::Reviews),
    Reviews => Some(Self::IsReviewedBy),
    IsDerivedFrom => Some(Self::IsSourceOf),
    IsSourceOf => Some(Self::IsDerivedFrom),
    IsRequiredBy => Some(Self::Requires),
    Requires => Some(Self::IsRequiredBy),
    Obsoletes => Some(Self::IsObsoletedBy),
    IsObsoletedBy => Some(Self::Obsoletes),
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
