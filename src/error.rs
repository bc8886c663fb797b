//! Error types
//!
//! Every fatal condition aborts the whole assembly run; there is no partial
//! result. Registry and repository failures keep their own error enums so
//! callers can distinguish a missing package from a transport problem.

use thiserror::Error;

/// Top-level error for an assembly run
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// A source file does not parse under the C# surface grammar.
    /// A partially rewritten project cannot compile, so the whole run aborts.
    #[error("failed to parse {file}: {reason}")]
    ParseFailure { file: String, reason: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Package registry client failures
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry has no package under this name. Fatal for the manifest:
    /// an unresolvable dependency means the generated project cannot build.
    #[error("package not found in registry: {package}")]
    PackageNotFound { package: String },

    #[error("registry request failed for {package}: {source}")]
    Transport {
        package: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("malformed registry response for {package}: {reason}")]
    MalformedResponse { package: String, reason: String },
}

/// Tree repository failures
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("tree not found: {root_id}")]
    TreeNotFound { root_id: String },

    #[error("node record {id} references missing parent {parent}")]
    DanglingParent { id: String, parent: String },

    #[error("node record {id} is not reachable from the root")]
    UnreachableRecord { id: String },

    #[error("record set has no root node")]
    MissingRoot,

    #[error("storage error: {0}")]
    Storage(String),
}
