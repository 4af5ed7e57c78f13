//! `folio collection` commands.

use crate::cli::CollectionCommand;
use crate::engine::Engine;

use super::describe;

/// Execute a `collection` subcommand.
///
/// # Errors
///
/// Returns an error string if the store cannot be read or written.
pub fn run(engine: &Engine, command: &CollectionCommand) -> Result<(), String> {
    match command {
        CollectionCommand::Create { title, description } => {
            let collection =
                engine.create_collection(title, description).map_err(|e| describe(&e))?;
            println!("Created collection {} ({})", collection.id, collection.identifier);
        }
        CollectionCommand::List => {
            let collections = engine.list_collections().map_err(|e| describe(&e))?;
            if collections.is_empty() {
                println!("No collections found.");
            }
            for c in &collections {
                println!("{:<38} {:<30} updated {}", c.id, c.title, c.updated.format("%Y-%m-%d %H:%M"));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support;

    #[test]
    fn create_then_list() {
        let engine = test_support::engine();
        run(&engine, &CollectionCommand::List).unwrap();
        run(
            &engine,
            &CollectionCommand::Create { title: "Atlas".into(), description: "maps".into() },
        )
        .unwrap();
        let listed = engine.list_collections().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Atlas");
        run(&engine, &CollectionCommand::List).unwrap();
    }
}
