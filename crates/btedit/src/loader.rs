//! File-system boundary: catalogue, tree and collection loading.
//!
//! A malformed file only fails its own load; a collection load skips bad
//! files with a warning and keeps going.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use bt_model::{Collection, Registry, Tree, TreeCategory, TypeRow};

/// Loads the node type catalogue (a JSON array of type rows).
pub fn load_registry(path: &Path) -> Result<Registry> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read catalogue {}", path.display()))?;
    let rows: Vec<TypeRow> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse catalogue {}", path.display()))?;
    Ok(Registry::load(rows)?)
}

/// Loads a single tree file.
pub fn load_tree(path: &Path, registry: &Registry) -> Result<Tree> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read tree file {}", path.display()))?;
    let doc: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse tree file {}", path.display()))?;
    Ok(Tree::from_document(doc, registry)?)
}

/// Writes a tree back to disk in document form.
pub fn save_tree(tree: &Tree, path: &Path) -> Result<()> {
    let doc = tree.to_document();
    let content = serde_json::to_string_pretty(&doc)?;
    fs::write(path, content)
        .with_context(|| format!("failed to write tree file {}", path.display()))?;
    Ok(())
}

/// Loads every tree under the category subdirectories of `dir`
/// (`keeper/`, `roles/`, `tactics/`, `strategies/`). Hidden files,
/// non-JSON files, malformed trees and duplicate names are skipped with a
/// log line instead of aborting the load.
pub fn load_collection(dir: &Path, registry: &Registry) -> Result<Collection> {
    let mut collection = Collection::new();
    for category in TreeCategory::ALL {
        let subdir = dir.join(category.dir_name());
        if !subdir.is_dir() {
            continue;
        }
        let mut entries: Vec<_> = fs::read_dir(&subdir)
            .with_context(|| format!("failed to read directory {}", subdir.display()))?
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let path = entry.path();
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if file_name.starts_with('.') {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                tracing::debug!(file = %path.display(), "not a json file, skipping");
                continue;
            }
            let tree = match load_tree(&path, registry) {
                Ok(tree) => tree,
                Err(error) => {
                    tracing::warn!(file = %path.display(), %error, "skipping invalid tree file");
                    continue;
                }
            };
            if tree.category != category {
                tracing::warn!(
                    file = %path.display(),
                    declared = %tree.category,
                    directory = %category,
                    "tree category does not match its directory"
                );
            }
            if let Err(error) = collection.insert(tree) {
                tracing::warn!(file = %path.display(), %error, "skipping duplicate tree");
            }
        }
    }
    tracing::debug!(trees = collection.len(), "collection loaded");
    Ok(collection)
}
