//! High-level operations.
//!
//! This module contains the implementation of Ignis commands.

pub mod create;
pub mod destroy;
pub mod graph;

pub use create::{create, CreateOptions, CreateResult, CreatedAsset};
pub use destroy::destroy_cluster;
pub use graph::{asset_graph, format_list, format_tree};
