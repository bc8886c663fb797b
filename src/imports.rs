//! Import Reconciler
//!
//! Two independent passes over the merged tree. Pass 1 strips using
//! directives whose target namespace no longer exists after module rewriting.
//! Pass 2 adds a using for every referenced type whose defining module is not
//! yet imported, using the type index.
//!
//! Pass 2 deliberately over-imports: any bare identifier in the file body
//! matching an indexed type counts as a reference. A false positive adds a
//! harmless unused using; a missing one would break compilation.

use crate::error::AssemblyError;
use crate::index::TypeIndex;
use crate::syntax::{self, using_target};
use crate::tree::{Folder, Language, Node, SourceFile};
use std::collections::BTreeSet;
use tracing::{debug, trace};

/// Pass 1: drop using directives whose target exactly matches a removed
/// namespace. All other lines are preserved byte-for-byte, in order.
pub fn remove_stale_imports(tree: &Folder, removed: &BTreeSet<String>) -> Folder {
    if removed.is_empty() {
        return tree.clone();
    }
    let mut dropped_total = 0usize;
    let stripped = strip_stale_folder(tree, removed, &mut dropped_total);
    debug!(dropped = dropped_total, "removed stale imports");
    stripped
}

fn strip_stale_folder(folder: &Folder, removed: &BTreeSet<String>, dropped: &mut usize) -> Folder {
    Folder {
        id: folder.id.clone(),
        name: folder.name.clone(),
        children: folder
            .children
            .iter()
            .map(|child| match child {
                Node::Folder(sub) => Node::Folder(strip_stale_folder(sub, removed, dropped)),
                Node::File(file) if file.language == Language::CSharp => {
                    Node::File(strip_stale(file, removed, dropped))
                }
                Node::File(file) => Node::File(file.clone()),
            })
            .collect(),
    }
}

fn strip_stale(file: &SourceFile, removed: &BTreeSet<String>, dropped: &mut usize) -> SourceFile {
    let any_stale = file
        .text
        .split_inclusive('\n')
        .any(|line| matches!(using_target(line), Some(t) if removed.contains(&t)));
    if !any_stale {
        return file.clone();
    }
    let mut text = String::with_capacity(file.text.len());
    for line in file.text.split_inclusive('\n') {
        match using_target(line) {
            Some(target) if removed.contains(&target) => {
                trace!(file = %file.name, %target, "dropping stale using");
                *dropped += 1;
            }
            _ => text.push_str(line),
        }
    }
    SourceFile {
        text,
        ..file.clone()
    }
}

/// Pass 2: add a using for every identifier that matches an indexed type
/// whose module path is not already imported and is not the file's own
/// namespace. The rebuilt using list is sorted lexicographically by target;
/// a file with nothing missing is returned byte-for-byte unchanged.
pub fn add_missing_imports(
    tree: &Folder,
    base_path: &str,
    index: &TypeIndex,
) -> Result<Folder, AssemblyError> {
    let mut added_total = 0usize;
    let result = crate::tree::map_files(tree, base_path, |file, _| {
        if file.language != Language::CSharp {
            return Ok(file.clone());
        }
        insert_missing(file, index, &mut added_total)
    })?;
    debug!(added = added_total, "added missing imports");
    Ok(result)
}

fn insert_missing(
    file: &SourceFile,
    index: &TypeIndex,
    added: &mut usize,
) -> Result<SourceFile, AssemblyError> {
    let own_namespace = syntax::find_namespace(&file.text)
        .map_err(|e| AssemblyError::ParseFailure {
            file: file.name.clone(),
            reason: e.to_string(),
        })?
        .map(|decl| decl.path);

    let existing: BTreeSet<String> = file
        .text
        .split_inclusive('\n')
        .filter_map(|line| using_target(line))
        .collect();

    // Scan the body only: directive lines and the namespace path would feed
    // their own dotted segments back into the next run's identifier set.
    let idents = syntax::body_identifiers(&file.text).map_err(|e| AssemblyError::ParseFailure {
        file: file.name.clone(),
        reason: e.to_string(),
    })?;

    let mut missing: BTreeSet<String> = BTreeSet::new();
    for ident in idents {
        if let Some(module) = index.module_of(&ident) {
            if existing.contains(module) {
                continue;
            }
            if own_namespace.as_deref() == Some(module) {
                continue;
            }
            missing.insert(module.to_string());
        }
    }

    // Idempotence: nothing missing, hand the text back untouched
    if missing.is_empty() {
        return Ok(file.clone());
    }
    *added += missing.len();
    trace!(file = %file.name, count = missing.len(), "inserting missing usings");

    // Collect the existing directive lines verbatim, then rewrite the whole
    // block sorted by target at the position of the first directive.
    let mut directives: Vec<(String, String)> = Vec::new();
    for line in file.text.split_inclusive('\n') {
        if let Some(target) = using_target(line) {
            directives.push((target, line.trim_end_matches(['\r', '\n']).to_string()));
        }
    }
    for module in &missing {
        directives.push((module.clone(), format!("using {module};")));
    }
    directives.sort_by(|a, b| a.0.cmp(&b.0));

    let mut text = String::with_capacity(file.text.len() + missing.len() * 24);
    let mut block_written = false;
    let had_directives = !existing.is_empty();
    if !had_directives {
        // No prior using block: the sorted block opens the file
        for (_, line) in &directives {
            text.push_str(line);
            text.push('\n');
        }
        text.push('\n');
        block_written = true;
    }
    for line in file.text.split_inclusive('\n') {
        if using_target(line).is_some() {
            if !block_written {
                for (_, directive) in &directives {
                    text.push_str(directive);
                    text.push('\n');
                }
                block_written = true;
            }
            continue;
        }
        text.push_str(line);
    }

    Ok(SourceFile {
        text,
        ..file.clone()
    })
}
