//! Command dispatch and handlers.

pub mod collection;
pub mod draft;
pub mod publish;
pub mod relation;
pub mod resource;
pub mod show;
pub mod validate;

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::engine::Engine;
use crate::error::Error;
use crate::model::CollectionId;

/// Dispatch a parsed command to its handler.
///
/// The engine is built from [`Config::from_env`], with `--store`
/// overriding `FOLIO_STORE`.
///
/// # Errors
///
/// Returns an error string if configuration is invalid or the selected
/// command handler fails.
pub fn dispatch(cli: &Cli) -> Result<(), String> {
    let mut config = Config::from_env()?;
    if let Some(store) = &cli.store {
        config.store.clone_from(store);
    }
    let engine = Engine::new(config.context(), &config.store);
    dispatch_with_engine(&cli.command, &engine, &config.actor)
}

/// Dispatch a command against the given engine on behalf of `actor`.
///
/// # Errors
///
/// Returns an error string if the command handler fails.
pub fn dispatch_with_engine(command: &Command, engine: &Engine, actor: &str) -> Result<(), String> {
    match command {
        Command::Collection(cmd) => collection::run(engine, cmd),
        Command::Draft(cmd) => draft::run(engine, actor, cmd),
        Command::Resource(cmd) => resource::run(engine, actor, cmd),
        Command::Relation(cmd) => relation::run(engine, actor, cmd),
        Command::Validate { collection } => validate::run(engine, &collection.as_str().into()),
        Command::Publish { collection } => publish::run(engine, actor, &collection.as_str().into()),
        Command::Show { collection, version, json } => {
            let format = if *json { show::Format::Json } else { show::Format::Yaml };
            show::run(engine, &collection.as_str().into(), version.as_deref(), format)
        }
        Command::Versions { collection } => show::run_versions(engine, &collection.as_str().into()),
    }
}

/// Fails unless `actor` may edit the draft of `collection`.
fn require_edit(engine: &Engine, actor: &str, collection: &CollectionId) -> Result<(), String> {
    if engine.context().permissions.can_edit(actor, collection) {
        Ok(())
    } else {
        Err(format!("{actor} may not edit collection {collection}"))
    }
}

/// Fails unless `actor` may publish `collection`.
fn require_publish(engine: &Engine, actor: &str, collection: &CollectionId) -> Result<(), String> {
    if engine.context().permissions.can_publish(actor, collection) {
        Ok(())
    } else {
        Err(format!("{actor} may not publish collection {collection}"))
    }
}

/// Renders a core error for the terminal, listing validation issues.
fn describe(err: &Error) -> String {
    match err {
        Error::Validation(issues) => {
            let mut lines = vec![err.to_string()];
            lines.extend(
                issues
                    .iter()
                    .map(|i| format!("  {} {}: {} {}", i.subject, i.title, i.field, i.message)),
            );
            lines.join("\n")
        }
        other => other.to_string(),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CollectionCommand;
    use crate::validate::ValidationIssue;

    #[test]
    fn dispatches_against_an_engine() {
        let engine = test_support::engine();
        let create = Command::Collection(CollectionCommand::Create {
            title: "Atlas".into(),
            description: String::new(),
        });
        dispatch_with_engine(&create, &engine, "local").unwrap();
        let id = engine.list_collections().unwrap()[0].id.clone();

        let versions = Command::Versions { collection: id.to_string() };
        assert!(dispatch_with_engine(&versions, &engine, "local").is_ok());
        let missing = Command::Versions { collection: "ghost".into() };
        assert_eq!(
            dispatch_with_engine(&missing, &engine, "local").unwrap_err(),
            "collection not found: ghost"
        );
    }

    #[test]
    fn validation_errors_list_their_issues() {
        let err = Error::Validation(vec![ValidationIssue::new("r-1", "A", "description", "is required")]);
        let text = describe(&err);
        assert!(text.starts_with("validation failed with 1 issue(s)"));
        assert!(text.contains("r-1 A: description is required"));
    }
}
