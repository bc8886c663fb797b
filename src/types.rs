//! Shared type aliases

/// Identifier assigned by the tree repository. Nodes synthesized in-memory
/// carry no id until the caller persists them.
pub type NodeId = String;
