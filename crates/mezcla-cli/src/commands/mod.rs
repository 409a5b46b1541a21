//! CLI subcommand implementations.

pub mod info;
pub mod nodes;
pub mod render;
