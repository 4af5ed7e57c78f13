//! Staged-to-published identity resolution.

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::model::{Action, CollectionRecord, Resource, ResourceId};

/// Maps each staged resource id to the id it will have once published.
///
/// Rows that leave the collection (`Delete`, `OldVersion`) have no entry.
#[derive(Debug, Default)]
pub struct IdentityMap {
    entries: HashMap<ResourceId, ResourceId>,
}

impl IdentityMap {
    /// Records that `staged` publishes as `published`.
    pub fn insert(&mut self, staged: ResourceId, published: ResourceId) {
        self.entries.insert(staged, published);
    }

    /// The published id of a staged resource, if it survives.
    #[must_use]
    pub fn resolve(&self, staged: &ResourceId) -> Option<&ResourceId> {
        self.entries.get(staged)
    }

    /// Resolves the source of a relation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] if the source does not survive.
    pub fn source(&self, staged: &ResourceId) -> Result<ResourceId> {
        self.resolve(staged)
            .cloned()
            .ok_or_else(|| Error::conflict(format!("relation source {staged} does not survive publish")))
    }

    /// Resolves the target of an internal relation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] if the target does not survive.
    pub fn target(&self, staged: &ResourceId) -> Result<ResourceId> {
        self.resolve(staged).cloned().ok_or_else(|| Error::conflict("dangling relation target"))
    }

    /// Number of surviving resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no resource survives.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Finds the published resource a `NewVersion` row supersedes by walking
/// its back-link chain to an `OldVersion` row carrying an original.
///
/// # Errors
///
/// Returns [`Error::NotFound`] for a broken chain and [`Error::Conflict`]
/// for a cyclic one.
pub fn prior_published(record: &CollectionRecord, head: &Resource) -> Result<ResourceId> {
    let mut seen = HashSet::from([head.id.clone()]);
    let mut current = head;
    loop {
        let back_link = current
            .back_link_id
            .as_ref()
            .ok_or_else(|| Error::state(format!("resource {} has no back-link", current.id)))?;
        if !seen.insert(back_link.clone()) {
            return Err(Error::conflict(format!("back-link cycle at resource {back_link}")));
        }
        let predecessor = record
            .resources
            .get(back_link)
            .ok_or_else(|| Error::not_found("previous version of resource", back_link))?;
        match (predecessor.action, &predecessor.original_resource_id) {
            (None, _) => return Ok(predecessor.id.clone()),
            (Some(Action::OldVersion), Some(original)) => return Ok(original.clone()),
            _ => current = predecessor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Collection, ResourceFields, VersionId};
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeSet;

    fn record(rows: Vec<Resource>) -> CollectionRecord {
        let at = Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap();
        let mut record = CollectionRecord::new(Collection {
            id: "c-1".into(),
            title: String::new(),
            description: String::new(),
            identifier: "c".into(),
            creators: Vec::new(),
            created: at,
            updated: at,
        });
        record.resources = rows.into_iter().map(|r| (r.id.clone(), r)).collect();
        record
    }

    fn row(id: &str, action: Option<Action>, original: Option<&str>, back: Option<&str>) -> Resource {
        let at = Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap();
        Resource {
            id: id.into(),
            versions: BTreeSet::from([VersionId::from("d")]),
            fields: ResourceFields::default(),
            filled_in: true,
            action,
            original_resource_id: original.map(ResourceId::from),
            back_link_id: back.map(ResourceId::from),
            created: at,
            updated: at,
        }
    }

    #[test]
    fn follows_back_link_to_the_original() {
        let head = row("new", Some(Action::NewVersion), Some("pub"), Some("old"));
        let rec = record(vec![
            row("pub", None, None, None),
            row("old", Some(Action::OldVersion), Some("pub"), None),
            head.clone(),
        ]);
        assert_eq!(prior_published(&rec, &head).unwrap(), ResourceId::from("pub"));
    }

    #[test]
    fn broken_and_cyclic_chains_are_errors() {
        let dangling = row("new", Some(Action::NewVersion), None, Some("gone"));
        assert!(matches!(
            prior_published(&record(vec![dangling.clone()]), &dangling),
            Err(Error::NotFound { .. })
        ));

        let a = row("a", Some(Action::NewVersion), None, Some("b"));
        let b = row("b", Some(Action::NewVersion), None, Some("a"));
        assert!(matches!(prior_published(&record(vec![a.clone(), b]), &a), Err(Error::Conflict(_))));
    }

    #[test]
    fn unmapped_targets_are_dangling() {
        let mut map = IdentityMap::default();
        map.insert("s".into(), "p".into());
        assert_eq!(map.target(&"s".into()).unwrap(), ResourceId::from("p"));
        let err = map.target(&"deleted".into()).unwrap_err();
        assert_eq!(err.to_string(), "conflict: dangling relation target");
    }
}
