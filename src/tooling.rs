//! CLI Tooling

pub mod cli;
