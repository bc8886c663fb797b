//! Module Rewriter
//!
//! Rewrites every C# file's namespace declaration to the module path derived
//! from its position in the merged tree, and records each namespace that
//! changed. The removed-namespace set drives stale-import removal.

use crate::error::AssemblyError;
use crate::syntax;
use crate::tree::{Folder, Language, SourceFile};
use std::collections::BTreeSet;
use tracing::{debug, trace};

/// Rewrite namespace declarations across the tree.
///
/// Returns the rebuilt tree and the set of old namespaces that no longer
/// exist after rewriting. A file whose namespace syntax is malformed aborts
/// the whole run: a partially rewritten project cannot compile.
pub fn rewrite_modules(
    tree: &Folder,
    base_path: &str,
) -> Result<(Folder, BTreeSet<String>), AssemblyError> {
    let mut removed: BTreeSet<String> = BTreeSet::new();
    let rewritten = crate::tree::map_files(tree, base_path, |file, module_path| {
        if file.language != Language::CSharp {
            return Ok(file.clone());
        }
        rewrite_file(file, module_path, &mut removed)
    })?;
    debug!(removed = removed.len(), "rewrote module declarations");
    Ok((rewritten, removed))
}

fn rewrite_file(
    file: &SourceFile,
    module_path: &str,
    removed: &mut BTreeSet<String>,
) -> Result<SourceFile, AssemblyError> {
    let decl = syntax::find_namespace(&file.text).map_err(|e| AssemblyError::ParseFailure {
        file: file.name.clone(),
        reason: e.to_string(),
    })?;

    let decl = match decl {
        Some(d) => d,
        // No declaration to rewrite; the type index derives this file's
        // module path from the folder chain regardless.
        None => return Ok(file.clone()),
    };

    if decl.path == module_path {
        return Ok(file.clone());
    }

    trace!(file = %file.name, old = %decl.path, new = %module_path, "rewriting namespace");
    removed.insert(decl.path.clone());

    let mut text = String::with_capacity(file.text.len());
    text.push_str(&file.text[..decl.span.start]);
    text.push_str(module_path);
    text.push_str(&file.text[decl.span.end..]);

    Ok(SourceFile {
        id: file.id.clone(),
        name: file.name.clone(),
        text,
        language: file.language.clone(),
    })
}
