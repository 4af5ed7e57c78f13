//! Collection creators (authors and organisations).

use serde::{Deserialize, Serialize};

use crate::validate::ValidationIssue;

/// Whether a creator is a person or an organisation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NameType {
    /// A person with given and family names.
    #[default]
    Personal,
    /// An organisation; only `given_name` is meaningful.
    Organizational,
}

/// One entry of a collection's creator list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    /// Given name, or the organisation name.
    pub given_name: String,
    /// Family name; empty for organisations.
    #[serde(default)]
    pub family_name: String,
    /// Person or organisation.
    #[serde(default)]
    pub name_type: NameType,
    /// Affiliation free text.
    #[serde(default)]
    pub affiliation: String,
    /// Persistent identifier (e.g. an ORCID).
    #[serde(default)]
    pub identifier: String,
    /// Scheme of `identifier`.
    #[serde(default)]
    pub identifier_type: String,
    /// Display name, derived by [`Creator::normalize_all`].
    #[serde(default)]
    pub creator_name: String,
    /// Position in the list, derived by [`Creator::normalize_all`].
    #[serde(default)]
    pub creator_index: usize,
}

impl Creator {
    /// Checks every creator and fills in the derived fields.
    ///
    /// # Errors
    ///
    /// Returns every problem found: an empty given name, or an identifier
    /// without its type (or the reverse).
    pub fn normalize_all(creators: Vec<Self>) -> Result<Vec<Self>, Vec<ValidationIssue>> {
        let mut issues = Vec::new();
        let normalized: Vec<Self> = creators
            .into_iter()
            .enumerate()
            .map(|(index, mut creator)| {
                let subject = format!("creators[{index}]");
                if creator.given_name.trim().is_empty() {
                    issues.push(ValidationIssue::new(
                        &subject,
                        &creator.family_name,
                        "given_name",
                        "must not be empty",
                    ));
                }
                if creator.identifier.is_empty() != creator.identifier_type.is_empty() {
                    issues.push(ValidationIssue::new(
                        &subject,
                        &creator.given_name,
                        "identifier",
                        "identifier and identifier_type must be set together",
                    ));
                }
                creator.creator_name = if creator.family_name.is_empty() {
                    creator.given_name.clone()
                } else {
                    format!("{}, {}", creator.family_name, creator.given_name)
                };
                creator.creator_index = index;
                creator
            })
            .collect();

        if issues.is_empty() {
            Ok(normalized)
        } else {
            Err(issues)
        }
    }
}
