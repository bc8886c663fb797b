//! Tree Merger
//!
//! Structurally merges multiple asset trees into one synthetic root. Folders
//! are unioned by case-sensitive name; files are always appended, never
//! deduplicated by name or content. The conventional bootstrap files are
//! dropped here and regenerated by the scaffolder, so every assembled project
//! has exactly one entry point.

use crate::tree::{Folder, Node};
use tracing::debug;

/// File names that never survive a merge. The scaffolder synthesizes fresh
/// replacements.
pub const RESERVED_BOOTSTRAP_FILES: [&str; 2] = ["Program.cs", "Startup.cs"];

/// Merge the given roots into one synthetic root folder.
///
/// Each input root's children are merged in sequence: a child folder whose
/// name matches an existing folder under the same parent is unioned into it
/// recursively; anything else is appended. Zero inputs yield an empty root.
pub fn merge_trees(roots: &[Folder]) -> Folder {
    let mut merged = Folder::new("");
    for root in roots {
        merge_children(&mut merged, root);
    }
    debug!(
        roots = roots.len(),
        files = merged.file_count(),
        "merged asset trees"
    );
    merged
}

fn merge_children(target: &mut Folder, source: &Folder) {
    for child in &source.children {
        match child {
            Node::File(file) => {
                if RESERVED_BOOTSTRAP_FILES.contains(&file.name.as_str()) {
                    debug!(file = %file.name, "dropping reserved bootstrap file");
                    continue;
                }
                target.children.push(Node::File(file.clone()));
            }
            Node::Folder(folder) => {
                if let Some(existing) = target.child_folder_mut(&folder.name) {
                    merge_children(existing, folder);
                } else {
                    let mut fresh = Folder::new(folder.name.clone());
                    merge_children(&mut fresh, folder);
                    target.children.push(Node::Folder(fresh));
                }
            }
        }
    }
}
