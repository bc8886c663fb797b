//! In-memory source tree model
//!
//! Folders and files as they move through the assembly pipeline. Every stage
//! returns a rebuilt tree rather than mutating shared nodes, so no stage can
//! observe another stage's intermediate state.
//!
//! A node's module path is never stored: it is recomputed from the ancestor
//! folder chain whenever a stage needs it, so it can never drift out of sync
//! with the tree shape.

use crate::types::NodeId;
use serde::{Deserialize, Serialize};

/// Source dialect tag. Only C# files are scanned and rewritten; files in any
/// other language ride through the pipeline untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    CSharp,
    Other(String),
}

/// A file node carrying source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub id: Option<NodeId>,
    pub name: String,
    pub text: String,
    pub language: Language,
}

/// A folder node. Child order is insertion order; it matters for
/// deterministic output, not for correctness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: Option<NodeId>,
    pub name: String,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    Folder(Folder),
    File(SourceFile),
}

impl SourceFile {
    pub fn new(name: impl Into<String>, text: impl Into<String>, language: Language) -> Self {
        SourceFile {
            id: None,
            name: name.into(),
            text: text.into(),
            language,
        }
    }

    /// File with C# source text
    pub fn csharp(name: impl Into<String>, text: impl Into<String>) -> Self {
        SourceFile::new(name, text, Language::CSharp)
    }
}

impl Folder {
    pub fn new(name: impl Into<String>) -> Self {
        Folder {
            id: None,
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Find a direct child folder by name (ordinal, case-sensitive)
    pub fn child_folder(&self, name: &str) -> Option<&Folder> {
        self.children.iter().find_map(|child| match child {
            Node::Folder(f) if f.name == name => Some(f),
            _ => None,
        })
    }

    /// Find a direct child folder by name, mutably
    pub fn child_folder_mut(&mut self, name: &str) -> Option<&mut Folder> {
        self.children.iter_mut().find_map(|child| match child {
            Node::Folder(f) if f.name == name => Some(f),
            _ => None,
        })
    }

    /// Direct child files
    pub fn files(&self) -> impl Iterator<Item = &SourceFile> {
        self.children.iter().filter_map(|child| match child {
            Node::File(f) => Some(f),
            _ => None,
        })
    }

    /// Total file count across the whole subtree
    pub fn file_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| match child {
                Node::File(_) => 1,
                Node::Folder(f) => f.file_count(),
            })
            .sum()
    }
}

/// Dotted module path for a node whose ancestor folders (below the synthetic
/// root, in descending order) are `ancestors`.
pub fn module_path(base_path: &str, ancestors: &[String]) -> String {
    if ancestors.is_empty() {
        base_path.to_string()
    } else {
        let mut path = String::from(base_path);
        for name in ancestors {
            path.push('.');
            path.push_str(name);
        }
        path
    }
}

/// Visit every file in the tree together with its module path.
///
/// The callback receives the file and the module path of its containing
/// folder, derived from the current tree shape.
pub fn visit_files<F>(root: &Folder, base_path: &str, mut visit: F)
where
    F: FnMut(&SourceFile, &str),
{
    let mut ancestors: Vec<String> = Vec::new();
    visit_files_inner(root, base_path, &mut ancestors, &mut visit);
}

fn visit_files_inner<F>(
    folder: &Folder,
    base_path: &str,
    ancestors: &mut Vec<String>,
    visit: &mut F,
) where
    F: FnMut(&SourceFile, &str),
{
    let path = module_path(base_path, ancestors);
    for child in &folder.children {
        match child {
            Node::File(file) => visit(file, &path),
            Node::Folder(sub) => {
                ancestors.push(sub.name.clone());
                visit_files_inner(sub, base_path, ancestors, visit);
                ancestors.pop();
            }
        }
    }
}

/// Rebuild the tree, transforming each file through `map`. The callback gets
/// the file and the module path of its containing folder; folder structure is
/// preserved as-is. The first error aborts the rebuild.
pub fn map_files<E, F>(root: &Folder, base_path: &str, mut map: F) -> Result<Folder, E>
where
    F: FnMut(&SourceFile, &str) -> Result<SourceFile, E>,
{
    let mut ancestors: Vec<String> = Vec::new();
    map_files_inner(root, base_path, &mut ancestors, &mut map)
}

fn map_files_inner<E, F>(
    folder: &Folder,
    base_path: &str,
    ancestors: &mut Vec<String>,
    map: &mut F,
) -> Result<Folder, E>
where
    F: FnMut(&SourceFile, &str) -> Result<SourceFile, E>,
{
    let path = module_path(base_path, ancestors);
    let mut out = Folder {
        id: folder.id.clone(),
        name: folder.name.clone(),
        children: Vec::with_capacity(folder.children.len()),
    };
    for child in &folder.children {
        match child {
            Node::File(file) => out.children.push(Node::File(map(file, &path)?)),
            Node::Folder(sub) => {
                ancestors.push(sub.name.clone());
                let mapped = map_files_inner(sub, base_path, ancestors, map)?;
                ancestors.pop();
                out.children.push(Node::Folder(mapped));
            }
        }
    }
    Ok(out)
}

/// Collect every distinct module path present in the tree, including the base
/// path itself, in first-visit order.
pub fn collect_module_paths(root: &Folder, base_path: &str) -> Vec<String> {
    let mut paths = vec![base_path.to_string()];
    let mut ancestors: Vec<String> = Vec::new();
    collect_paths_inner(root, base_path, &mut ancestors, &mut paths);
    paths
}

fn collect_paths_inner(
    folder: &Folder,
    base_path: &str,
    ancestors: &mut Vec<String>,
    paths: &mut Vec<String>,
) {
    for child in &folder.children {
        if let Node::Folder(sub) = child {
            ancestors.push(sub.name.clone());
            let path = module_path(base_path, ancestors);
            if !paths.contains(&path) {
                paths.push(path);
            }
            collect_paths_inner(sub, base_path, ancestors, paths);
            ancestors.pop();
        }
    }
}
