//! Type Index Builder
//!
//! Maps declared type names to the module path that contains them after
//! merging. Built fresh per assembly run from the post-rewrite tree and
//! discarded afterwards; never persisted.

use crate::tree::{self, Folder, Language};
use std::collections::HashMap;
use tracing::debug;

/// Ephemeral index from type name to module path.
///
/// Keys compare case-insensitively. Insertion is last-write-wins: when the
/// same type name is declared in two files the later visit overwrites the
/// earlier entry. Collisions across merged assets are a known unresolved
/// ambiguity and are not surfaced to the caller.
#[derive(Debug, Default, Clone)]
pub struct TypeIndex {
    entries: HashMap<String, IndexEntry>,
}

#[derive(Debug, Clone)]
struct IndexEntry {
    type_name: String,
    module_path: String,
}

impl TypeIndex {
    pub fn new() -> Self {
        TypeIndex {
            entries: HashMap::new(),
        }
    }

    /// Insert a type, overwriting any previous entry for the same name
    pub fn insert(&mut self, type_name: &str, module_path: &str) {
        let key = type_name.to_ascii_lowercase();
        if let Some(previous) = self.entries.get(&key) {
            if previous.module_path != module_path {
                debug!(
                    type_name,
                    old = %previous.module_path,
                    new = %module_path,
                    "type name collision, keeping later declaration"
                );
            }
        }
        self.entries.insert(
            key,
            IndexEntry {
                type_name: type_name.to_string(),
                module_path: module_path.to_string(),
            },
        );
    }

    /// Module path for a type name, case-insensitive
    pub fn module_of(&self, type_name: &str) -> Option<&str> {
        self.entries
            .get(&type_name.to_ascii_lowercase())
            .map(|e| e.module_path.as_str())
    }

    /// Declared name as it appeared in source
    pub fn declared_name(&self, type_name: &str) -> Option<&str> {
        self.entries
            .get(&type_name.to_ascii_lowercase())
            .map(|e| e.type_name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Scan every C# file in the post-rewrite tree and index its top-level type
/// declarations against the file's module path. Files in other languages are
/// skipped silently.
pub fn build_type_index(tree: &Folder, base_path: &str) -> TypeIndex {
    let mut index = TypeIndex::new();
    tree::visit_files(tree, base_path, |file, module_path| {
        if file.language != Language::CSharp {
            return;
        }
        for name in crate::syntax::scan_type_names(&file.text) {
            index.insert(&name, module_path);
        }
    });
    debug!(types = index.len(), "built type index");
    index
}
