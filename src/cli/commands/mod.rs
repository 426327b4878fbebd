//! CLI command implementations

pub mod catalog;
pub mod completions;
pub mod gen;
pub mod update;
