//! Project Scaffolder
//!
//! Synthesizes the two files every assembled project needs: a fresh
//! `Program.cs` bootstrapping the web host and importing every module
//! subtree, and a `.csproj` manifest whose package references are resolved
//! against the package registry.
//!
//! Both files are newly synthesized: they carry no id until the caller
//! persists them.

use crate::config::ScaffoldSettings;
use crate::error::AssemblyError;
use crate::registry::PackageRegistryClient;
use crate::tree::{self, Folder, Language, SourceFile};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Name of the synthesized entry-point file
pub const ENTRY_POINT_FILE: &str = "Program.cs";

/// Using targets under this prefix belong to the runtime, not the registry
pub const STANDARD_LIBRARY_PREFIX: &str = "System";

/// Framework usings every synthesized entry point starts with
const BOOTSTRAP_USINGS: [&str; 3] = [
    "Microsoft.AspNetCore.Builder",
    "Microsoft.Extensions.DependencyInjection",
    "Microsoft.Extensions.Hosting",
];

/// Synthesize the entry point and the manifest for a reconciled tree.
///
/// Registry lookups run sequentially, one per distinct package; the first
/// unresolvable package aborts the whole scaffold. There is no partial
/// manifest.
pub async fn scaffold(
    tree: &Folder,
    base_path: &str,
    settings: &ScaffoldSettings,
    registry: &dyn PackageRegistryClient,
) -> Result<(SourceFile, SourceFile), AssemblyError> {
    let entry_point = synthesize_entry_point(tree, base_path);
    let manifest = synthesize_manifest(tree, base_path, settings, registry).await?;
    Ok((entry_point, manifest))
}

/// Build the entry-point file: framework bootstrap usings, one using per
/// module subtree, and the fixed bootstrap statement sequence.
pub fn synthesize_entry_point(tree: &Folder, base_path: &str) -> SourceFile {
    let mut module_usings: Vec<String> = tree::collect_module_paths(tree, base_path)
        .into_iter()
        .filter(|path| path != base_path)
        .collect();
    module_usings.sort();

    let mut text = String::new();
    for target in BOOTSTRAP_USINGS {
        text.push_str(&format!("using {target};\n"));
    }
    for target in &module_usings {
        text.push_str(&format!("using {target};\n"));
    }
    text.push_str("\nvar builder = WebApplication.CreateBuilder(args);\n\n");
    text.push_str("builder.Services.AddControllers();\n");
    // Automatic registration of discovered types against their interfaces is
    // a deferred extension point.
    text.push_str("// builder.Services.AddScoped<IMyService, MyService>();\n");
    text.push_str("\nvar app = builder.Build();\n\n");
    text.push_str("app.UseRouting();\napp.MapControllers();\n\napp.Run();\n");

    debug!(modules = module_usings.len(), "synthesized entry point");
    SourceFile::csharp(ENTRY_POINT_FILE, text)
}

/// Collect the distinct using targets across the tree that name registry
/// packages: everything except the standard library and the project's own
/// namespaces.
pub fn collect_package_targets(tree: &Folder, base_path: &str) -> BTreeSet<String> {
    let mut targets = BTreeSet::new();
    tree::visit_files(tree, base_path, |file, _| {
        if file.language != Language::CSharp {
            return;
        }
        for line in file.text.lines() {
            if let Some(target) = crate::syntax::using_target(line) {
                if is_standard_library(&target) || is_project_internal(&target, base_path) {
                    continue;
                }
                targets.insert(target);
            }
        }
    });
    targets
}

fn is_standard_library(target: &str) -> bool {
    target == STANDARD_LIBRARY_PREFIX
        || target.starts_with(&format!("{STANDARD_LIBRARY_PREFIX}."))
}

fn is_project_internal(target: &str, base_path: &str) -> bool {
    target == base_path || target.starts_with(&format!("{base_path}."))
}

/// Build the `.csproj` manifest, resolving every package reference to its
/// latest published version.
pub async fn synthesize_manifest(
    tree: &Folder,
    base_path: &str,
    settings: &ScaffoldSettings,
    registry: &dyn PackageRegistryClient,
) -> Result<SourceFile, AssemblyError> {
    let targets = collect_package_targets(tree, base_path);

    let mut resolved: Vec<(String, String)> = Vec::with_capacity(targets.len());
    for package in &targets {
        let version = registry.get_latest_version(package).await?;
        resolved.push((package.clone(), version));
    }
    info!(packages = resolved.len(), "resolved manifest dependencies");

    let flag = |enabled: bool| if enabled { "enable" } else { "disable" };
    let mut text = String::new();
    text.push_str("<Project Sdk=\"Microsoft.NET.Sdk.Web\">\n\n");
    text.push_str("  <PropertyGroup>\n");
    text.push_str(&format!(
        "    <TargetFramework>{}</TargetFramework>\n",
        settings.target_framework
    ));
    text.push_str(&format!(
        "    <Nullable>{}</Nullable>\n",
        flag(settings.nullable)
    ));
    text.push_str(&format!(
        "    <ImplicitUsings>{}</ImplicitUsings>\n",
        flag(settings.implicit_usings)
    ));
    text.push_str("  </PropertyGroup>\n");
    if !resolved.is_empty() {
        text.push_str("\n  <ItemGroup>\n");
        for (package, version) in &resolved {
            text.push_str(&format!(
                "    <PackageReference Include=\"{package}\" Version=\"{version}\" />\n"
            ));
        }
        text.push_str("  </ItemGroup>\n");
    }
    text.push_str("\n</Project>\n");

    Ok(SourceFile::new(
        format!("{base_path}.csproj"),
        text,
        Language::Other("msbuild".to_string()),
    ))
}
