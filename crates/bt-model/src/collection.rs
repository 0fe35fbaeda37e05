//! Collection - all loaded trees, partitioned into the four categories.
//!
//! Cross-tree links (Strategy -> Tactic -> Role) are name-based lookups
//! resolved at verification time, never owning references, so a referenced
//! tree can be renamed or deleted independently and dangling references
//! surface as findings instead of crashes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::tree::Tree;

/// The mandated nesting layer a tree belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeCategory {
    Keeper,
    Role,
    Tactic,
    Strategy,
}

impl TreeCategory {
    pub const ALL: [TreeCategory; 4] = [
        TreeCategory::Keeper,
        TreeCategory::Role,
        TreeCategory::Tactic,
        TreeCategory::Strategy,
    ];

    /// Directory name the category's tree files live under.
    pub fn dir_name(self) -> &'static str {
        match self {
            TreeCategory::Keeper => "keeper",
            TreeCategory::Role => "roles",
            TreeCategory::Tactic => "tactics",
            TreeCategory::Strategy => "strategies",
        }
    }
}

impl fmt::Display for TreeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// All loaded trees, keyed by name within each category bucket. Tree names
/// are unique per category, not globally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    buckets: BTreeMap<TreeCategory, BTreeMap<String, Tree>>,
}

impl Collection {
    pub fn new() -> Collection {
        Collection::default()
    }

    /// Adds a tree, failing with `DuplicateName` if its name is already
    /// taken within its category.
    pub fn insert(&mut self, tree: Tree) -> Result<()> {
        let bucket = self.buckets.entry(tree.category).or_default();
        if bucket.contains_key(&tree.name) {
            return Err(ModelError::DuplicateName {
                category: tree.category,
                name: tree.name,
            });
        }
        bucket.insert(tree.name.clone(), tree);
        Ok(())
    }

    /// Adds or overwrites a tree; the save-over path in the editor.
    pub fn replace(&mut self, tree: Tree) -> Option<Tree> {
        self.buckets
            .entry(tree.category)
            .or_default()
            .insert(tree.name.clone(), tree)
    }

    pub fn remove(&mut self, category: TreeCategory, name: &str) -> Option<Tree> {
        let removed = self.buckets.get_mut(&category)?.remove(name);
        if removed.is_none() {
            tracing::warn!(%category, name, "requested tree to remove could not be found");
        }
        removed
    }

    /// Renames a tree in place, keeping its bucket consistent.
    pub fn rename(&mut self, category: TreeCategory, old: &str, new: &str) -> Result<()> {
        let bucket = self.buckets.entry(category).or_default();
        if bucket.contains_key(new) {
            return Err(ModelError::DuplicateName {
                category,
                name: new.to_string(),
            });
        }
        let mut tree = bucket.remove(old).ok_or_else(|| ModelError::UnknownTree {
            category,
            name: old.to_string(),
        })?;
        tree.name = new.to_string();
        bucket.insert(new.to_string(), tree);
        Ok(())
    }

    /// Weak-reference lookup used by the verifier's cross-tree checks.
    pub fn resolve(&self, category: TreeCategory, name: &str) -> Option<&Tree> {
        self.buckets.get(&category)?.get(name)
    }

    pub fn resolve_mut(&mut self, category: TreeCategory, name: &str) -> Option<&mut Tree> {
        self.buckets.get_mut(&category)?.get_mut(name)
    }

    /// All trees, category then name order.
    pub fn all_trees(&self) -> impl Iterator<Item = &Tree> {
        self.buckets.values().flat_map(|bucket| bucket.values())
    }

    /// Trees of one category, name order.
    pub fn trees_in(&self, category: TreeCategory) -> impl Iterator<Item = &Tree> {
        self.buckets
            .get(&category)
            .into_iter()
            .flat_map(|bucket| bucket.values())
    }

    /// Tree names per category, for listings.
    pub fn names(&self) -> BTreeMap<TreeCategory, Vec<String>> {
        self.buckets
            .iter()
            .map(|(category, bucket)| (*category, bucket.keys().cloned().collect()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
