//! Completeness checks over a draft.
//!
//! Every staged resource that will survive publish is checked for its
//! required fields. All failures are collected into one report; relations
//! are not inspected here.

use serde::Serialize;

use crate::error::Result;
use crate::model::{Action, CollectionRecord, Resource};

/// One failed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Id of the offending row, or a path such as `creators[1]`.
    pub subject: String,
    /// Human label of the offending row, for display.
    pub title: String,
    /// Name of the failing field.
    pub field: String,
    /// What is wrong.
    pub message: String,
}

impl ValidationIssue {
    /// Builds an issue.
    #[must_use]
    pub fn new(subject: &str, title: &str, field: &str, message: &str) -> Self {
        Self {
            subject: subject.to_string(),
            title: title.to_string(),
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Aggregated result of validating a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// `true` when `errors` is empty.
    pub valid: bool,
    /// Every issue found.
    pub errors: Vec<ValidationIssue>,
}

impl ValidationReport {
    fn from_issues(errors: Vec<ValidationIssue>) -> Self {
        Self { valid: errors.is_empty(), errors }
    }
}

/// Validates the collection's draft.
///
/// # Errors
///
/// Returns [`crate::error::Error::State`] when the collection has no draft.
/// Incomplete resources are reported in the returned report, not as errors.
pub fn validate(record: &CollectionRecord) -> Result<ValidationReport> {
    let draft = record.require_draft()?;
    let errors = record
        .resources_in(&draft)
        .filter(|r| r.action.is_none_or(Action::survives_publish))
        .flat_map(check_resource)
        .collect();
    Ok(ValidationReport::from_issues(errors))
}

fn check_resource(resource: &Resource) -> Vec<ValidationIssue> {
    let f = &resource.fields;
    [
        ("title", &f.title),
        ("description", &f.description),
        ("resource_type", &f.resource_type),
        ("identifier", &f.identifier),
        ("identifier_type", &f.identifier_type),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| ValidationIssue::new(resource.id.as_str(), &f.title, field, "is required"))
    .collect()
}

/// Formats a `ValidationReport` as a human-readable report.
#[must_use]
pub fn format_report(report: &ValidationReport) -> String {
    let mut lines = Vec::new();
    for issue in &report.errors {
        let label = if issue.title.is_empty() { "(untitled)" } else { issue.title.as_str() };
        lines.push(format!("  [FAIL] {} {label}: {} {}", issue.subject, issue.field, issue.message));
    }
    if !report.errors.is_empty() {
        lines.push(String::new());
    }
    let overall = if report.valid { "VALID" } else { "INVALID" };
    lines.push(format!("Result: {overall} ({} issue(s))", report.errors.len()));
    lines.join("\n")
}
