//! Data types for collections, versions, resources, and relations.
//!
//! Every type here is plain serde data. Behaviour lives in the component
//! modules (`tagging`, `draft`, `relations`, `validate`, `publish`), which
//! operate on a [`CollectionRecord`] loaded from the store.

mod action;
mod collection;
mod creator;
mod ids;
mod record;
mod relation;
mod relation_type;
mod resource;
mod version;

pub use action::Action;
pub use collection::Collection;
pub use creator::{Creator, NameType};
pub use ids::{CollectionId, RelationId, ResourceId, VersionId};
pub use record::CollectionRecord;
pub use relation::{ExternalFields, ExternalRelation, InternalFields, InternalRelation};
pub use relation_type::RelationType;
pub use resource::{Resource, ResourceFields, ResourcePatch};
pub use version::{Version, DRAFT_NAME};
