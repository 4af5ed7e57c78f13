//! `folio show` and `folio versions` commands.

use crate::engine::{Engine, VersionSnapshot};
use crate::model::{CollectionId, Version};

use super::describe;

/// Output format for `show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// YAML, the store's own format.
    Yaml,
    /// Pretty-printed JSON.
    Json,
}

/// Execute the `show` command: print one version with its rows.
///
/// # Errors
///
/// Returns an error string if the collection or version does not exist.
pub fn run(
    engine: &Engine,
    collection: &CollectionId,
    version: Option<&str>,
    format: Format,
) -> Result<(), String> {
    let snapshot = engine.version_snapshot(collection, version).map_err(|e| describe(&e))?;
    println!("{}", render(&snapshot, format)?);
    Ok(())
}

fn render(snapshot: &VersionSnapshot, format: Format) -> Result<String, String> {
    let rendered = match format {
        Format::Yaml => serde_yaml::to_string(snapshot).map_err(|e| e.to_string()),
        Format::Json => serde_json::to_string_pretty(snapshot).map_err(|e| e.to_string()),
    };
    rendered.map(|text| text.trim_end().to_string()).map_err(|e| {
        format!("failed to render version {}: {e}", snapshot.version.identifier)
    })
}

/// Execute the `versions` command.
///
/// # Errors
///
/// Returns an error string if the collection does not exist.
pub fn run_versions(engine: &Engine, collection: &CollectionId) -> Result<(), String> {
    let versions = engine.list_versions(collection).map_err(|e| describe(&e))?;
    if versions.is_empty() {
        println!("No versions yet.");
        println!("\nUse `folio draft open {collection}` to start one.");
        return Ok(());
    }
    println!("Versions of {collection}:");
    for version in &versions {
        println!("  {}", version_line(version));
    }
    Ok(())
}

fn version_line(version: &Version) -> String {
    match version.published_on {
        Some(on) if version.published => {
            format!("{} {} published {}", version.identifier, version.name, on.format("%Y-%m-%d"))
        }
        _ => format!("{} {} (draft)", version.identifier, version.name),
    }
}
