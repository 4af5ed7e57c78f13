//! `folio relation` commands.
//!
//! Relation ids are unique across both tables, so `edit`, `delete`, and
//! `restore` look the id up to decide which kind of relation to act on.

use crate::cli::RelationCommand;
use crate::engine::Engine;
use crate::model::{
    Action, CollectionId, CollectionRecord, ExternalFields, InternalFields, RelationId, RelationType,
    ResourceId,
};
use crate::relations::RelationDeleteOutcome;

use super::{describe, require_edit};

enum Kind {
    Internal,
    External,
}

fn kind_of(record: &CollectionRecord, relation: &RelationId) -> Result<Kind, String> {
    if record.internal_relations.contains_key(relation) {
        Ok(Kind::Internal)
    } else if record.external_relations.contains_key(relation) {
        Ok(Kind::External)
    } else {
        Err(format!("relation not found: {relation}"))
    }
}

fn print_inverse(relation_type: RelationType) {
    if let Some(inverse) = relation_type.mirror() {
        println!("  inverse type: {inverse}");
    }
}

/// Optional field changes passed to `relation edit`.
struct FieldEdits<'a> {
    target: Option<&'a String>,
    target_type: Option<&'a String>,
    relation_type: Option<RelationType>,
    resource_type: Option<&'a String>,
}

/// Execute a `relation` subcommand.
///
/// # Errors
///
/// Returns an error string if the actor may not edit the collection, the
/// relation does not exist, or the core operation fails.
pub fn run(engine: &Engine, actor: &str, command: &RelationCommand) -> Result<(), String> {
    let collection = match command {
        RelationCommand::AddInternal { collection, .. }
        | RelationCommand::AddExternal { collection, .. }
        | RelationCommand::Edit { collection, .. }
        | RelationCommand::Delete { collection, .. }
        | RelationCommand::Restore { collection, .. } => CollectionId::from(collection.as_str()),
    };
    require_edit(engine, actor, &collection)?;

    match command {
        RelationCommand::AddInternal { source, target, relation_type, resource_type, .. } => {
            let fields = InternalFields {
                target_id: ResourceId::from(target.as_str()),
                relation_type: relation_type.as_str().to_string(),
                resource_type: resource_type.clone(),
            };
            add_internal(engine, &collection, source, fields, *relation_type)
        }
        RelationCommand::AddExternal {
            source, target, target_type, relation_type, resource_type, ..
        } => {
            let fields = ExternalFields {
                target: target.clone(),
                target_type: target_type.clone(),
                relation_type: relation_type.as_str().to_string(),
                resource_type: resource_type.clone(),
            };
            add_external(engine, &collection, source, fields, *relation_type)
        }
        RelationCommand::Edit {
            relation, target, target_type, relation_type, resource_type, ..
        } => {
            let edits = FieldEdits {
                target: target.as_ref(),
                target_type: target_type.as_ref(),
                relation_type: *relation_type,
                resource_type: resource_type.as_ref(),
            };
            edit(engine, &collection, &RelationId::from(relation.as_str()), &edits)
        }
        RelationCommand::Delete { relation, .. } => {
            delete(engine, &collection, &RelationId::from(relation.as_str()))
        }
        RelationCommand::Restore { relation, .. } => {
            restore(engine, &collection, &RelationId::from(relation.as_str()))
        }
    }
}

fn add_internal(
    engine: &Engine,
    collection: &CollectionId,
    source: &str,
    fields: InternalFields,
    relation_type: RelationType,
) -> Result<(), String> {
    let added = engine
        .add_internal_relation(collection, &ResourceId::from(source), fields)
        .map_err(|e| describe(&e))?;
    println!(
        "Added relation {}: {} {} {}",
        added.id, added.source_id, added.fields.relation_type, added.fields.target_id
    );
    print_inverse(relation_type);
    Ok(())
}

fn add_external(
    engine: &Engine,
    collection: &CollectionId,
    source: &str,
    fields: ExternalFields,
    relation_type: RelationType,
) -> Result<(), String> {
    let added = engine
        .add_external_relation(collection, &ResourceId::from(source), fields)
        .map_err(|e| describe(&e))?;
    println!(
        "Added relation {}: {} {} {}",
        added.id, added.source_id, added.fields.relation_type, added.fields.target
    );
    print_inverse(relation_type);
    Ok(())
}

fn edit(
    engine: &Engine,
    collection: &CollectionId,
    id: &RelationId,
    edits: &FieldEdits<'_>,
) -> Result<(), String> {
    let record = engine.record(collection).map_err(|e| describe(&e))?;
    let action = match kind_of(&record, id)? {
        Kind::Internal => {
            if edits.target_type.is_some() {
                return Err("--target-type applies to external relations only".to_string());
            }
            let mut fields = record.internal(id).map_err(|e| describe(&e))?.fields.clone();
            if let Some(target) = edits.target {
                fields.target_id = ResourceId::from(target.as_str());
            }
            if let Some(kind) = edits.relation_type {
                fields.relation_type = kind.as_str().to_string();
            }
            if let Some(resource_type) = edits.resource_type {
                fields.resource_type.clone_from(resource_type);
            }
            engine.edit_internal_relation(collection, id, fields).map_err(|e| describe(&e))?.action
        }
        Kind::External => {
            let mut fields = record.external(id).map_err(|e| describe(&e))?.fields.clone();
            if let Some(target) = edits.target {
                fields.target.clone_from(target);
            }
            if let Some(target_type) = edits.target_type {
                fields.target_type.clone_from(target_type);
            }
            if let Some(kind) = edits.relation_type {
                fields.relation_type = kind.as_str().to_string();
            }
            if let Some(resource_type) = edits.resource_type {
                fields.resource_type.clone_from(resource_type);
            }
            engine.edit_external_relation(collection, id, fields).map_err(|e| describe(&e))?.action
        }
    };
    println!("Edited relation {id} [{}]", action_label(action));
    Ok(())
}

fn delete(engine: &Engine, collection: &CollectionId, id: &RelationId) -> Result<(), String> {
    let record = engine.record(collection).map_err(|e| describe(&e))?;
    let marked = match kind_of(&record, id)? {
        Kind::Internal => matches!(
            engine.delete_internal_relation(collection, id).map_err(|e| describe(&e))?,
            RelationDeleteOutcome::MarkedDeleted(_)
        ),
        Kind::External => matches!(
            engine.delete_external_relation(collection, id).map_err(|e| describe(&e))?,
            RelationDeleteOutcome::MarkedDeleted(_)
        ),
    };
    if marked {
        println!("Marked relation {id} for deletion");
    } else {
        println!("Removed relation {id}");
    }
    Ok(())
}

fn restore(engine: &Engine, collection: &CollectionId, id: &RelationId) -> Result<(), String> {
    let record = engine.record(collection).map_err(|e| describe(&e))?;
    let action = match kind_of(&record, id)? {
        Kind::Internal => {
            engine.restore_internal_relation(collection, id).map_err(|e| describe(&e))?.action
        }
        Kind::External => {
            engine.restore_external_relation(collection, id).map_err(|e| describe(&e))?.action
        }
    };
    println!("Restored relation {id} [{}]", action_label(action));
    Ok(())
}

fn action_label(action: Option<Action>) -> String {
    action.map_or_else(|| "published".to_string(), |a| a.to_string())
}
