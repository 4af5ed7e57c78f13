//! `folio draft` commands.

use crate::cli::DraftCommand;
use crate::engine::Engine;
use crate::model::{CollectionId, Creator};

use super::{describe, require_edit};

/// Execute a `draft` subcommand.
///
/// # Errors
///
/// Returns an error string if the actor may not edit the collection, the
/// creators file cannot be read, or the core operation fails.
pub fn run(engine: &Engine, actor: &str, command: &DraftCommand) -> Result<(), String> {
    match command {
        DraftCommand::Open { collection } => {
            let id = CollectionId::from(collection.as_str());
            require_edit(engine, actor, &id)?;
            let outcome = engine.get_or_create_draft(&id).map_err(|e| describe(&e))?;
            let verb = if outcome.created { "Opened" } else { "Already open:" };
            println!("{verb} draft {} ({})", outcome.version.identifier, outcome.version.id);
        }
        DraftCommand::Discard { collection } => {
            let id = CollectionId::from(collection.as_str());
            require_edit(engine, actor, &id)?;
            let removed = engine.delete_draft(&id).map_err(|e| describe(&e))?;
            println!("Discarded draft {}", removed.identifier);
        }
        DraftCommand::Changelog { collection, text } => {
            let id = CollectionId::from(collection.as_str());
            require_edit(engine, actor, &id)?;
            let version = engine.set_changelog(&id, text).map_err(|e| describe(&e))?;
            println!("Changelog set on {}", version.identifier);
        }
        DraftCommand::Creators { collection, file } => {
            let id = CollectionId::from(collection.as_str());
            require_edit(engine, actor, &id)?;
            let contents = engine
                .context()
                .fs
                .read_to_string(file)
                .map_err(|e| format!("failed to read {}: {e}", file.display()))?;
            let creators: Vec<Creator> = serde_yaml::from_str(&contents)
                .map_err(|e| format!("failed to parse {}: {e}", file.display()))?;
            let creators = engine.set_creators(&id, creators).map_err(|e| describe(&e))?;
            println!("Set {} creator(s)", creators.len());
        }
    }
    Ok(())
}
