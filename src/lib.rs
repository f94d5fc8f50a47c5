//! Ignis - asset generation for cluster bootstrap configuration
//!
//! This crate provides the dependency graph that loads or generates
//! installation assets, the bootstrap config composer, and the platform
//! teardown registry.

pub mod asset;
pub mod assets;
pub mod bundle;
pub mod destroy;
pub mod ops;
pub mod template;
pub mod types;
pub mod util;

/// Test utilities for Ignis unit tests.
///
/// This module is only available when compiling with `--cfg test`. It
/// provides an in-memory file fetcher, counting test assets and fixture
/// data directories.
#[cfg(test)]
pub mod test_support;

pub use asset::{Asset, AssetCatalog, AssetId, AssetSource, GraphError, Store};
pub use assets::BootstrapSettings;
pub use destroy::{Destroyer, DestroyerRegistry};
pub use util::context::GlobalContext;
