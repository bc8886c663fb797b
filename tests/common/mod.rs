//! Shared fixtures for the integration suite

use async_trait::async_trait;
use codeweld::error::RegistryError;
use codeweld::registry::PackageRegistryClient;
use codeweld::tree::{Folder, Node, SourceFile};
use std::collections::HashMap;

/// Registry stub answering from a fixed table; anything else is not found
pub struct TableRegistry {
    versions: HashMap<String, String>,
}

impl TableRegistry {
    pub fn new(entries: &[(&str, &str)]) -> Self {
        TableRegistry {
            versions: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Resolves every package to 1.0.0
    pub fn wildcard() -> WildcardRegistry {
        WildcardRegistry
    }
}

#[async_trait]
impl PackageRegistryClient for TableRegistry {
    async fn get_latest_version(&self, package: &str) -> Result<String, RegistryError> {
        self.versions
            .get(package)
            .cloned()
            .ok_or_else(|| RegistryError::PackageNotFound {
                package: package.to_string(),
            })
    }
}

pub struct WildcardRegistry;

#[async_trait]
impl PackageRegistryClient for WildcardRegistry {
    async fn get_latest_version(&self, _package: &str) -> Result<String, RegistryError> {
        Ok("1.0.0".to_string())
    }
}

pub fn folder(name: &str, children: Vec<Node>) -> Folder {
    let mut f = Folder::new(name);
    f.children = children;
    f
}

pub fn cs(name: &str, text: &str) -> Node {
    Node::File(SourceFile::csharp(name, text))
}

/// The two-project fixture from the assembly scenario: ProjectOne with a
/// controller depending on ProjectTwo's service, both with their own
/// bootstrap files.
pub fn project_one() -> Folder {
    folder(
        "ProjectOne",
        vec![
            cs("File1.cs", "namespace ProjectOne;\n\npublic class File1 { }\n"),
            Node::Folder(folder(
                "Controllers",
                vec![cs(
                    "HomeController.cs",
                    "using Microsoft.AspNetCore.Mvc;\nusing ProjectTwo.Services;\n\nnamespace ProjectOne.Controllers;\n\npublic class HomeController\n{\n    private readonly IMyService _service;\n}\n",
                )],
            )),
            cs("Program.cs", "class Program { static void Main() { } }\n"),
        ],
    )
}

pub fn project_two() -> Folder {
    folder(
        "ProjectTwo",
        vec![
            cs("File2.cs", "namespace ProjectTwo;\n\npublic class File2 { }\n"),
            Node::Folder(folder(
                "Services",
                vec![
                    cs(
                        "IMyService.cs",
                        "namespace ProjectTwo.Services;\n\npublic interface IMyService { }\n",
                    ),
                    cs(
                        "MyService.cs",
                        "using System.Linq;\n\nnamespace ProjectTwo.Services;\n\npublic class MyService : IMyService { }\n",
                    ),
                ],
            )),
            cs("Startup.cs", "class Startup { }\n"),
        ],
    )
}
