//! `folio resource` commands.

use crate::cli::ResourceCommand;
use crate::engine::Engine;
use crate::model::{CollectionId, Resource, ResourceId};
use crate::tagging::DeleteOutcome;

use super::{describe, require_edit};

/// Execute a `resource` subcommand.
///
/// # Errors
///
/// Returns an error string if the actor may not edit the collection or the
/// core operation fails.
pub fn run(engine: &Engine, actor: &str, command: &ResourceCommand) -> Result<(), String> {
    let collection = match command {
        ResourceCommand::Add { collection, .. }
        | ResourceCommand::Edit { collection, .. }
        | ResourceCommand::Delete { collection, .. }
        | ResourceCommand::Restore { collection, .. }
        | ResourceCommand::NewVersion { collection, .. }
        | ResourceCommand::Revert { collection, .. } => CollectionId::from(collection.as_str()),
    };
    require_edit(engine, actor, &collection)?;

    match command {
        ResourceCommand::Add { fields, .. } => {
            let added = engine
                .add_resource(&collection, fields.clone().into_fields())
                .map_err(|e| describe(&e))?;
            print_row("Added", &added);
        }
        ResourceCommand::Edit { resource, fields, .. } => {
            let patch = fields.clone().into_patch();
            if patch.is_empty() {
                return Err("nothing to change: pass at least one field flag".to_string());
            }
            let edited = engine
                .edit_resource(&collection, &ResourceId::from(resource.as_str()), &patch)
                .map_err(|e| describe(&e))?;
            print_row("Edited", &edited);
        }
        ResourceCommand::Delete { resource, .. } => {
            let id = ResourceId::from(resource.as_str());
            match engine.delete_resource(&collection, &id).map_err(|e| describe(&e))? {
                DeleteOutcome::Removed => println!("Removed resource {id}"),
                DeleteOutcome::MarkedDeleted(row) => print_row("Marked for deletion", &row),
                DeleteOutcome::Unwound(row) => print_row("Dropped new version; restored", &row),
            }
        }
        ResourceCommand::Restore { resource, .. } => {
            let restored = engine
                .restore_resource(&collection, &ResourceId::from(resource.as_str()))
                .map_err(|e| describe(&e))?;
            print_row("Restored", &restored);
        }
        ResourceCommand::NewVersion { resource, .. } => {
            let head = engine
                .start_new_version(&collection, &ResourceId::from(resource.as_str()))
                .map_err(|e| describe(&e))?;
            print_row("Started new version", &head);
        }
        ResourceCommand::Revert { resource, .. } => {
            let restored = engine
                .restore_from_new_version(&collection, &ResourceId::from(resource.as_str()))
                .map_err(|e| describe(&e))?;
            print_row("Reverted to", &restored);
        }
    }
    Ok(())
}

fn print_row(verb: &str, resource: &Resource) {
    let action = resource.action.map_or_else(|| "published".to_string(), |a| a.to_string());
    println!("{verb} resource {} [{action}] {}", resource.id, resource.fields.title);
}
