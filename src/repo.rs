//! Tree Repository
//!
//! The external collaborator that persists asset trees. It deals in flat
//! node records (id, parent id, name, kind, payload); this module holds the
//! record shape, the trait seam, conversion between records and the in-memory
//! tree, and an in-memory implementation backing the tests.
//!
//! The engine only fetches source trees and hands the assembled tree back;
//! it never writes to storage itself.

use crate::error::RepositoryError;
use crate::tree::{Folder, Language, Node, SourceFile};
use crate::types::NodeId;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Node kind discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Folder,
    File,
}

/// Flat persisted shape of one tree node. `parent: None` marks the root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub name: String,
    pub kind: NodeKind,
    /// Source text, files only
    pub text: Option<String>,
    /// Dialect tag, files only
    pub language: Option<Language>,
}

/// Persistence collaborator for asset trees
#[async_trait]
pub trait TreeRepository: Send + Sync {
    /// Fetch all records of the tree rooted at `root_id`
    async fn fetch_tree(&self, root_id: &NodeId) -> Result<Vec<NodeRecord>, RepositoryError>;

    /// Persist a record set, returning the root id
    async fn persist_tree(&self, records: Vec<NodeRecord>) -> Result<NodeId, RepositoryError>;
}

/// Rebuild the in-memory tree from a flat record set.
///
/// Record order within a sibling set is preserved. Every record must be
/// reachable from the root through folder parents; a record parented into a
/// cycle or onto a file would otherwise vanish from the rebuilt tree.
pub fn records_to_tree(records: &[NodeRecord]) -> Result<Folder, RepositoryError> {
    let root = records
        .iter()
        .find(|r| r.parent.is_none() && r.kind == NodeKind::Folder)
        .ok_or(RepositoryError::MissingRoot)?;

    let ids: HashMap<&str, &NodeRecord> =
        records.iter().map(|r| (r.id.as_str(), r)).collect();
    for record in records {
        if let Some(parent) = &record.parent {
            if !ids.contains_key(parent.as_str()) {
                return Err(RepositoryError::DanglingParent {
                    id: record.id.clone(),
                    parent: parent.clone(),
                });
            }
        }
    }

    let mut reachable: HashSet<&str> = HashSet::new();
    reachable.insert(root.id.as_str());
    let mut frontier = vec![root];
    while let Some(current) = frontier.pop() {
        for child in records
            .iter()
            .filter(|r| r.parent.as_deref() == Some(current.id.as_str()))
        {
            reachable.insert(child.id.as_str());
            if child.kind == NodeKind::Folder {
                frontier.push(child);
            }
        }
    }
    if let Some(orphan) = records.iter().find(|r| !reachable.contains(r.id.as_str())) {
        return Err(RepositoryError::UnreachableRecord {
            id: orphan.id.clone(),
        });
    }

    Ok(build_folder(root, records))
}

fn build_folder(record: &NodeRecord, records: &[NodeRecord]) -> Folder {
    let mut folder = Folder {
        id: Some(record.id.clone()),
        name: record.name.clone(),
        children: Vec::new(),
    };
    for child in records.iter().filter(|r| r.parent.as_ref() == Some(&record.id)) {
        match child.kind {
            NodeKind::Folder => folder.children.push(Node::Folder(build_folder(child, records))),
            NodeKind::File => folder.children.push(Node::File(SourceFile {
                id: Some(child.id.clone()),
                name: child.name.clone(),
                text: child.text.clone().unwrap_or_default(),
                language: child
                    .language
                    .clone()
                    .unwrap_or(Language::Other(String::new())),
            })),
        }
    }
    folder
}

/// Flatten a tree into records, calling `fresh_id` for every node that has no
/// persisted identity yet (synthesized bootstrap and manifest files included).
pub fn tree_to_records(root: &Folder, fresh_id: &mut dyn FnMut() -> NodeId) -> Vec<NodeRecord> {
    let mut records = Vec::new();
    flatten_folder(root, None, fresh_id, &mut records);
    records
}

fn flatten_folder(
    folder: &Folder,
    parent: Option<NodeId>,
    fresh_id: &mut dyn FnMut() -> NodeId,
    records: &mut Vec<NodeRecord>,
) {
    let id = folder.id.clone().unwrap_or_else(|| fresh_id());
    records.push(NodeRecord {
        id: id.clone(),
        parent,
        name: folder.name.clone(),
        kind: NodeKind::Folder,
        text: None,
        language: None,
    });
    for child in &folder.children {
        match child {
            Node::Folder(sub) => flatten_folder(sub, Some(id.clone()), fresh_id, records),
            Node::File(file) => records.push(NodeRecord {
                id: file.id.clone().unwrap_or_else(|| fresh_id()),
                parent: Some(id.clone()),
                name: file.name.clone(),
                kind: NodeKind::File,
                text: Some(file.text.clone()),
                language: Some(file.language.clone()),
            }),
        }
    }
}

/// In-memory repository used by tests and the CLI round-trip
#[derive(Default)]
pub struct InMemoryTreeRepository {
    trees: RwLock<HashMap<NodeId, Vec<NodeRecord>>>,
    counter: RwLock<u64>,
}

impl InMemoryTreeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a tree, assigning fresh ids where missing, and return its root id
    pub fn insert_tree(&self, root: &Folder) -> NodeId {
        let mut next = self.counter.write();
        let mut alloc = || {
            *next += 1;
            format!("node-{}", *next)
        };
        let records = tree_to_records(root, &mut alloc);
        let root_id = records[0].id.clone();
        drop(next);
        self.trees.write().insert(root_id.clone(), records);
        root_id
    }
}

#[async_trait]
impl TreeRepository for InMemoryTreeRepository {
    async fn fetch_tree(&self, root_id: &NodeId) -> Result<Vec<NodeRecord>, RepositoryError> {
        self.trees
            .read()
            .get(root_id)
            .cloned()
            .ok_or_else(|| RepositoryError::TreeNotFound {
                root_id: root_id.clone(),
            })
    }

    async fn persist_tree(&self, mut records: Vec<NodeRecord>) -> Result<NodeId, RepositoryError> {
        let root_id = records
            .first()
            .map(|r| r.id.clone())
            .ok_or(RepositoryError::MissingRoot)?;
        for record in &mut records {
            if record.id.is_empty() {
                return Err(RepositoryError::Storage(
                    "record persisted without an id".to_string(),
                ));
            }
        }
        self.trees.write().insert(root_id.clone(), records);
        Ok(root_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_folder() -> Folder {
        let mut root = Folder::new("ProjectOne");
        let mut services = Folder::new("Services");
        services
            .children
            .push(Node::File(SourceFile::csharp("MyService.cs", "class MyService { }")));
        root.children.push(Node::Folder(services));
        root.children
            .push(Node::File(SourceFile::csharp("File1.cs", "class File1 { }")));
        root
    }

    #[test]
    fn test_round_trip_preserves_shape() {
        let tree = sample_folder();
        let mut n = 0u32;
        let mut alloc = || {
            n += 1;
            format!("id-{n}")
        };
        let records = tree_to_records(&tree, &mut alloc);
        assert_eq!(records.len(), 4);

        let rebuilt = records_to_tree(&records).unwrap();
        assert_eq!(rebuilt.name, "ProjectOne");
        assert_eq!(rebuilt.file_count(), 2);
        assert!(rebuilt.child_folder("Services").is_some());
    }

    #[test]
    fn test_records_to_tree_requires_root() {
        let records = vec![NodeRecord {
            id: "a".into(),
            parent: Some("missing".into()),
            name: "x".into(),
            kind: NodeKind::File,
            text: None,
            language: None,
        }];
        assert!(matches!(
            records_to_tree(&records),
            Err(RepositoryError::MissingRoot)
        ));
    }

    #[test]
    fn test_records_to_tree_detects_dangling_parent() {
        let records = vec![
            NodeRecord {
                id: "root".into(),
                parent: None,
                name: "".into(),
                kind: NodeKind::Folder,
                text: None,
                language: None,
            },
            NodeRecord {
                id: "f".into(),
                parent: Some("gone".into()),
                name: "a.cs".into(),
                kind: NodeKind::File,
                text: Some(String::new()),
                language: Some(Language::CSharp),
            },
        ];
        assert!(matches!(
            records_to_tree(&records),
            Err(RepositoryError::DanglingParent { .. })
        ));
    }

    #[test]
    fn test_records_to_tree_rejects_parent_cycle() {
        // "a" and "b" parent each other; neither is reachable from the root
        let folder = |id: &str, parent: Option<&str>| NodeRecord {
            id: id.into(),
            parent: parent.map(String::from),
            name: id.into(),
            kind: NodeKind::Folder,
            text: None,
            language: None,
        };
        let records = vec![
            folder("root", None),
            folder("a", Some("b")),
            folder("b", Some("a")),
        ];
        assert!(matches!(
            records_to_tree(&records),
            Err(RepositoryError::UnreachableRecord { id }) if id == "a"
        ));
    }

    #[test]
    fn test_records_to_tree_rejects_file_parent() {
        let records = vec![
            NodeRecord {
                id: "root".into(),
                parent: None,
                name: "".into(),
                kind: NodeKind::Folder,
                text: None,
                language: None,
            },
            NodeRecord {
                id: "f".into(),
                parent: Some("root".into()),
                name: "a.cs".into(),
                kind: NodeKind::File,
                text: Some(String::new()),
                language: Some(Language::CSharp),
            },
            NodeRecord {
                id: "g".into(),
                parent: Some("f".into()),
                name: "b.cs".into(),
                kind: NodeKind::File,
                text: Some(String::new()),
                language: Some(Language::CSharp),
            },
        ];
        assert!(matches!(
            records_to_tree(&records),
            Err(RepositoryError::UnreachableRecord { id }) if id == "g"
        ));
    }

    #[tokio::test]
    async fn test_in_memory_repository_round_trip() {
        let repo = InMemoryTreeRepository::new();
        let root_id = repo.insert_tree(&sample_folder());

        let records = repo.fetch_tree(&root_id).await.unwrap();
        let tree = records_to_tree(&records).unwrap();
        assert_eq!(tree.file_count(), 2);

        assert!(matches!(
            repo.fetch_tree(&"nope".to_string()).await,
            Err(RepositoryError::TreeNotFound { .. })
        ));
    }
}
