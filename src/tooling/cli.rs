//! CLI Tooling
//!
//! Command-line interface for running the assembly pipeline against asset
//! trees on disk: read N directories, assemble, write the result.

use crate::config::EngineConfig;
use crate::engine::AssemblyEngine;
use crate::error::AssemblyError;
use crate::registry::NuGetClient;
use crate::tree::{Folder, Language, Node, SourceFile};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use walkdir::WalkDir;

/// codeweld - assemble C# source trees into one buildable project
#[derive(Parser)]
#[command(name = "codeweld")]
#[command(about = "Assembles independently authored C# source trees into one buildable project")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Assemble asset directories into one project
    Assemble {
        /// Asset tree directories to merge
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Base namespace (and project name) for the assembled project
        #[arg(long, default_value = "StartProject")]
        base: String,

        /// Output directory for the assembled project
        #[arg(long, default_value = "./assembled")]
        out: PathBuf,
    },
}

impl Cli {
    /// Resolve the effective configuration: file + env, then CLI overrides
    pub fn effective_config(&self) -> Result<EngineConfig, AssemblyError> {
        let mut config = EngineConfig::load(self.config.as_deref())?;
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.logging.format = format.clone();
        }
        Ok(config)
    }
}

/// Run one parsed command to completion
pub async fn execute(cli: &Cli, config: &EngineConfig) -> Result<(), AssemblyError> {
    match &cli.command {
        Commands::Assemble { inputs, base, out } => {
            let mut roots = Vec::with_capacity(inputs.len());
            for input in inputs {
                roots.push(read_asset_tree(input)?);
            }

            let registry = NuGetClient::new(
                config.registry.base_url.clone(),
                Duration::from_secs(config.registry.timeout_secs),
            )?;
            let engine = AssemblyEngine::new(Arc::new(registry), config.scaffold.clone());
            let assembled = engine.assemble(&roots, base).await?;

            write_tree(&assembled, out)?;
            info!(out = %out.display(), files = assembled.file_count(), "assembled project written");
            Ok(())
        }
    }
}

/// Read a directory into an asset tree. File language is tagged by
/// extension; anything that is not UTF-8 text is skipped.
pub fn read_asset_tree(root: &Path) -> Result<Folder, AssemblyError> {
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut folder = Folder::new(name);

    for entry in WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
    {
        let entry = entry.map_err(|e| AssemblyError::Config(format!("walk failed: {e}")))?;
        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| AssemblyError::Config(format!("path outside root: {e}")))?;

        if entry.file_type().is_dir() {
            ensure_folder(&mut folder, relative);
        } else if entry.file_type().is_file() {
            let text = match std::fs::read_to_string(entry.path()) {
                Ok(text) => text,
                Err(_) => continue, // non-text payloads are not source assets
            };
            let file_name = entry.file_name().to_string_lossy().into_owned();
            let language = match entry.path().extension().and_then(|e| e.to_str()) {
                Some("cs") => Language::CSharp,
                Some(other) => Language::Other(other.to_string()),
                None => Language::Other(String::new()),
            };
            let parent = relative.parent().unwrap_or_else(|| Path::new(""));
            ensure_folder(&mut folder, parent)
                .children
                .push(Node::File(SourceFile::new(file_name, text, language)));
        }
    }
    Ok(folder)
}

/// Walk down (creating as needed) to the folder at `relative`
fn ensure_folder<'a>(root: &'a mut Folder, relative: &Path) -> &'a mut Folder {
    let mut current = root;
    for component in relative.components() {
        let name = component.as_os_str().to_string_lossy().into_owned();
        let exists = current.child_folder(&name).is_some();
        if !exists {
            current.children.push(Node::Folder(Folder::new(name.clone())));
        }
        current = current
            .child_folder_mut(&name)
            .expect("folder was just ensured");
    }
    current
}

/// Write an assembled tree back to disk
pub fn write_tree(tree: &Folder, out: &Path) -> Result<(), AssemblyError> {
    std::fs::create_dir_all(out)
        .map_err(|e| AssemblyError::Config(format!("cannot create {}: {e}", out.display())))?;
    for child in &tree.children {
        match child {
            Node::Folder(sub) => write_tree(sub, &out.join(&sub.name))?,
            Node::File(file) => {
                let path = out.join(&file.name);
                std::fs::write(&path, &file.text).map_err(|e| {
                    AssemblyError::Config(format!("cannot write {}: {e}", path.display()))
                })?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_asset_tree_builds_nested_folders() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("ProjectOne");
        std::fs::create_dir_all(root.join("Services")).unwrap();
        std::fs::write(root.join("File1.cs"), "class File1 { }").unwrap();
        std::fs::write(root.join("Services/MyService.cs"), "class MyService { }").unwrap();
        std::fs::write(root.join("readme.md"), "# notes").unwrap();

        let tree = read_asset_tree(&root).unwrap();
        assert_eq!(tree.name, "ProjectOne");
        assert_eq!(tree.file_count(), 3);
        let services = tree.child_folder("Services").unwrap();
        assert_eq!(services.files().next().unwrap().language, Language::CSharp);
        assert!(tree
            .files()
            .any(|f| f.name == "readme.md" && f.language == Language::Other("md".into())));
    }

    #[test]
    fn test_write_tree_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut root = Folder::new("");
        let mut sub = Folder::new("Services");
        sub.children
            .push(Node::File(SourceFile::csharp("A.cs", "class A { }")));
        root.children.push(Node::Folder(sub));

        let out = dir.path().join("out");
        write_tree(&root, &out).unwrap();
        assert_eq!(
            std::fs::read_to_string(out.join("Services/A.cs")).unwrap(),
            "class A { }"
        );
    }
}
