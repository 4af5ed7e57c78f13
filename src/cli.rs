//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::model::{RelationType, ResourceFields, ResourcePatch};

/// Top-level CLI parser for `folio`.
#[derive(Debug, Parser)]
#[command(name = "folio", version, about = "Draft, edit, and publish versioned collections")]
pub struct Cli {
    /// Store directory (overrides `FOLIO_STORE`).
    #[arg(long, global = true, value_name = "DIR")]
    pub store: Option<PathBuf>,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create and list collections.
    #[command(subcommand)]
    Collection(CollectionCommand),
    /// Open, discard, and annotate the draft.
    #[command(subcommand)]
    Draft(DraftCommand),
    /// Edit resources in the draft.
    #[command(subcommand)]
    Resource(ResourceCommand),
    /// Edit relations in the draft.
    #[command(subcommand)]
    Relation(RelationCommand),
    /// Check the draft for missing required fields.
    Validate {
        /// Collection id.
        collection: String,
    },
    /// Publish the draft as a new version.
    Publish {
        /// Collection id.
        collection: String,
    },
    /// Print a version with its resources and relations as YAML.
    Show {
        /// Collection id.
        collection: String,
        /// Version identifier; defaults to the latest version.
        #[arg(long)]
        version: Option<String>,
        /// Print JSON instead of YAML.
        #[arg(long)]
        json: bool,
    },
    /// List a collection's versions.
    Versions {
        /// Collection id.
        collection: String,
    },
}

/// `folio collection ...`
#[derive(Debug, Subcommand)]
pub enum CollectionCommand {
    /// Create an empty collection.
    Create {
        /// Collection title.
        #[arg(long)]
        title: String,
        /// Collection description.
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List collections, most recently updated first.
    List,
}

/// `folio draft ...`
#[derive(Debug, Subcommand)]
pub enum DraftCommand {
    /// Return the draft, cloning the latest published version if needed.
    Open {
        /// Collection id.
        collection: String,
    },
    /// Discard the draft and everything staged in it.
    Discard {
        /// Collection id.
        collection: String,
    },
    /// Set the draft's changelog.
    Changelog {
        /// Collection id.
        collection: String,
        /// Changelog text.
        text: String,
    },
    /// Replace the creators from a YAML list.
    Creators {
        /// Collection id.
        collection: String,
        /// YAML file holding a list of creators.
        file: PathBuf,
    },
}

/// Resource field flags shared by `add` and `edit`.
#[derive(Debug, Clone, Default, Args)]
pub struct ResourceArgs {
    /// Title.
    #[arg(long)]
    pub title: Option<String>,
    /// Description.
    #[arg(long)]
    pub description: Option<String>,
    /// Resource type (e.g. dataset, software).
    #[arg(long)]
    pub resource_type: Option<String>,
    /// Identifier.
    #[arg(long)]
    pub identifier: Option<String>,
    /// Identifier scheme (e.g. DOI, URL).
    #[arg(long)]
    pub identifier_type: Option<String>,
    /// The resource's own version label.
    #[arg(long)]
    pub version_label: Option<String>,
}

impl ResourceArgs {
    /// Fields for a new resource; unset flags are empty.
    #[must_use]
    pub fn into_fields(self) -> ResourceFields {
        ResourceFields {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            resource_type: self.resource_type.unwrap_or_default(),
            identifier: self.identifier.unwrap_or_default(),
            identifier_type: self.identifier_type.unwrap_or_default(),
            version_label: self.version_label.unwrap_or_default(),
        }
    }

    /// A patch setting only the flags that were given.
    #[must_use]
    pub fn into_patch(self) -> ResourcePatch {
        ResourcePatch {
            title: self.title,
            description: self.description,
            resource_type: self.resource_type,
            identifier: self.identifier,
            identifier_type: self.identifier_type,
            version_label: self.version_label,
        }
    }
}

/// `folio resource ...`
#[derive(Debug, Subcommand)]
pub enum ResourceCommand {
    /// Add a resource to the draft.
    Add {
        /// Collection id.
        collection: String,
        /// Field values.
        #[command(flatten)]
        fields: ResourceArgs,
    },
    /// Change fields of a staged resource.
    Edit {
        /// Collection id.
        collection: String,
        /// Resource id.
        resource: String,
        /// Fields to change.
        #[command(flatten)]
        fields: ResourceArgs,
    },
    /// Delete a staged resource (or unwind a new version).
    Delete {
        /// Collection id.
        collection: String,
        /// Resource id.
        resource: String,
    },
    /// Restore a deleted resource.
    Restore {
        /// Collection id.
        collection: String,
        /// Resource id.
        resource: String,
    },
    /// Start a new revision of a staged resource.
    NewVersion {
        /// Collection id.
        collection: String,
        /// Resource id.
        resource: String,
    },
    /// Drop a new revision and restore the resource it replaced.
    Revert {
        /// Collection id.
        collection: String,
        /// Id of the new revision.
        resource: String,
    },
}

/// `folio relation ...`
#[derive(Debug, Subcommand)]
pub enum RelationCommand {
    /// Relate a resource to another resource of the draft.
    AddInternal {
        /// Collection id.
        collection: String,
        /// Source resource id.
        source: String,
        /// Target resource id.
        #[arg(long)]
        target: String,
        /// Relation type.
        #[arg(long = "type")]
        relation_type: RelationType,
        /// Resource type of the target.
        #[arg(long, default_value = "")]
        resource_type: String,
    },
    /// Relate a resource to something outside the collection.
    AddExternal {
        /// Collection id.
        collection: String,
        /// Source resource id.
        source: String,
        /// External target (URI, DOI, ...).
        #[arg(long)]
        target: String,
        /// Scheme of the target.
        #[arg(long, default_value = "")]
        target_type: String,
        /// Relation type.
        #[arg(long = "type")]
        relation_type: RelationType,
        /// Resource type of the target.
        #[arg(long, default_value = "")]
        resource_type: String,
    },
    /// Change fields of a staged relation.
    Edit {
        /// Collection id.
        collection: String,
        /// Relation id.
        relation: String,
        /// New target.
        #[arg(long)]
        target: Option<String>,
        /// New target scheme (external relations only).
        #[arg(long)]
        target_type: Option<String>,
        /// New relation type.
        #[arg(long = "type")]
        relation_type: Option<RelationType>,
        /// New resource type.
        #[arg(long)]
        resource_type: Option<String>,
    },
    /// Delete a staged relation.
    Delete {
        /// Collection id.
        collection: String,
        /// Relation id.
        relation: String,
    },
    /// Restore a deleted relation.
    Restore {
        /// Collection id.
        collection: String,
        /// Relation id.
        relation: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_store_after_subcommand() {
        let cli = Cli::parse_from(["folio", "versions", "c-1", "--store", "/tmp/s"]);
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/s")));
        assert!(matches!(cli.command, Command::Versions { ref collection } if collection == "c-1"));
    }

    #[test]
    fn parses_nested_resource_edit() {
        let cli = Cli::parse_from(["folio", "resource", "edit", "c-1", "r-1", "--title", "B"]);
        let Command::Resource(ResourceCommand::Edit { fields, .. }) = cli.command else {
            panic!("expected resource edit");
        };
        let patch = fields.into_patch();
        assert_eq!(patch.title.as_deref(), Some("B"));
        assert!(patch.description.is_none());
    }

    #[test]
    fn relation_types_come_from_the_vocabulary() {
        let cli = Cli::parse_from([
            "folio", "relation", "add-internal", "c-1", "r-1", "--target", "r-2", "--type", "IsPartOf",
        ]);
        assert!(matches!(
            cli.command,
            Command::Relation(RelationCommand::AddInternal { relation_type: RelationType::IsPartOf, .. })
        ));
        let bad = Cli::try_parse_from([
            "folio", "relation", "add-internal", "c-1", "r-1", "--target", "r-2", "--type", "Likes",
        ]);
        assert!(bad.is_err());
    }
}
