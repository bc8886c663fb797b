//! codeweld: Project Assembly Engine
//!
//! Takes N independently authored C# source trees and merges them into a
//! single, internally consistent, buildable project: tree merging with
//! bootstrap-file exclusion, namespace rewriting, cross-file type indexing,
//! import reconciliation, and entry-point plus manifest scaffolding backed by
//! a package registry.

pub mod config;
pub mod engine;
pub mod error;
pub mod imports;
pub mod index;
pub mod logging;
pub mod merge;
pub mod registry;
pub mod repo;
pub mod rewrite;
pub mod scaffold;
pub mod syntax;
pub mod tooling;
pub mod tree;
pub mod types;
