//! `folio validate` command.

use crate::engine::Engine;
use crate::model::CollectionId;
use crate::validate::format_report;

use super::describe;

/// Execute the `validate` command.
///
/// Prints the report; an invalid draft is an error so that scripts can
/// rely on the exit status.
///
/// # Errors
///
/// Returns an error string if there is no draft or the draft is invalid.
pub fn run(engine: &Engine, collection: &CollectionId) -> Result<(), String> {
    let report = engine.validate(collection).map_err(|e| describe(&e))?;
    println!("{}", format_report(&report));
    if report.valid {
        Ok(())
    } else {
        Err(format!("draft of {collection} is not ready to publish"))
    }
}
