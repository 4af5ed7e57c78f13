//! `folio publish` command.

use crate::engine::Engine;
use crate::model::CollectionId;

use super::{describe, require_publish};

/// Execute the `publish` command.
///
/// # Errors
///
/// Returns an error string if the actor may not publish, the draft is
/// missing or invalid, or publishing conflicts with the stored rows.
pub fn run(engine: &Engine, actor: &str, collection: &CollectionId) -> Result<(), String> {
    require_publish(engine, actor, collection)?;
    let version = engine.publish(collection).map_err(|e| describe(&e))?;
    println!("Published {} ({})", version.name, version.identifier);
    Ok(())
}
