//! Assembly pipeline
//!
//! Orchestrates the full assembly of N asset trees into one buildable
//! project: merge, namespace rewriting, stale-import removal, type indexing,
//! missing-import insertion, then scaffolding. Each stage fully consumes the
//! previous stage's output; any fatal error aborts the whole run with no
//! partial result.

use crate::config::ScaffoldSettings;
use crate::error::AssemblyError;
use crate::registry::PackageRegistryClient;
use crate::repo::{self, TreeRepository};
use crate::tree::{Folder, Node};
use crate::types::NodeId;
use crate::{imports, index, merge, rewrite, scaffold};
use std::sync::Arc;
use tracing::{info, instrument};

/// Project assembly engine.
///
/// Owns the registry client and the manifest settings; each `assemble` call
/// builds its own tree from scratch, so concurrent invocations share no
/// mutable state.
pub struct AssemblyEngine {
    registry: Arc<dyn PackageRegistryClient>,
    scaffold_settings: ScaffoldSettings,
}

impl AssemblyEngine {
    pub fn new(registry: Arc<dyn PackageRegistryClient>, scaffold_settings: ScaffoldSettings) -> Self {
        AssemblyEngine {
            registry,
            scaffold_settings,
        }
    }

    /// Assemble the given asset trees into one project tree.
    ///
    /// The result contains every reconciled source file plus exactly one
    /// synthesized entry point and one synthesized manifest, both without
    /// persisted identity.
    #[instrument(skip(self, roots), fields(assets = roots.len(), base = base_path))]
    pub async fn assemble(
        &self,
        roots: &[Folder],
        base_path: &str,
    ) -> Result<Folder, AssemblyError> {
        let merged = merge::merge_trees(roots);
        info!(files = merged.file_count(), "stage 1: trees merged");

        let (rewritten, removed_namespaces) = rewrite::rewrite_modules(&merged, base_path)?;
        info!(
            removed = removed_namespaces.len(),
            "stage 2: module declarations rewritten"
        );

        let pruned = imports::remove_stale_imports(&rewritten, &removed_namespaces);
        info!("stage 3: stale imports removed");

        let type_index = index::build_type_index(&pruned, base_path);
        info!(types = type_index.len(), "stage 4: type index built");

        let reconciled = imports::add_missing_imports(&pruned, base_path, &type_index)?;
        info!("stage 5: missing imports added");

        let (entry_point, manifest) =
            scaffold::scaffold(&reconciled, base_path, &self.scaffold_settings, &*self.registry)
                .await?;
        info!("stage 6: project scaffolded");

        let mut assembled = reconciled;
        assembled.children.push(Node::File(entry_point));
        assembled.children.push(Node::File(manifest));
        Ok(assembled)
    }

    /// Fetch stored asset trees from the repository and assemble them.
    ///
    /// Persistence of the result stays with the caller.
    pub async fn assemble_stored(
        &self,
        repository: &dyn TreeRepository,
        root_ids: &[NodeId],
        base_path: &str,
    ) -> Result<Folder, AssemblyError> {
        let mut roots = Vec::with_capacity(root_ids.len());
        for root_id in root_ids {
            let records = repository.fetch_tree(root_id).await?;
            roots.push(repo::records_to_tree(&records)?);
        }
        self.assemble(&roots, base_path).await
    }
}
