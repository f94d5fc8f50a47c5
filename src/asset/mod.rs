//! Asset graph.
//!
//! An asset is a typed node that declares its dependencies and knows how to
//! produce itself. The [`Store`] resolves assets depth-first, memoized by
//! [`AssetId`], trying [`Asset::load`] before [`Asset::generate`].
//!
//! Assets are created through an [`AssetCatalog`], which maps each id to a
//! constructor and validates the declared graph before anything runs.

pub mod catalog;
pub mod disk;
pub mod parents;
pub mod store;

pub use catalog::{AssetCatalog, AssetGraph, CatalogError};
pub use disk::{persist_to_dir, DiskFetcher, FetchError, FileFetcher};
pub use parents::Parents;
pub use store::{AssetSource, GraphError, Store};

use std::any::Any;
use std::fmt;

use anyhow::Result;

/// Stable identifier of an asset type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(&'static str);

impl AssetId {
    pub const fn new(id: &'static str) -> Self {
        AssetId(id)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A file produced (or reloaded) by an asset.
///
/// `filename` is relative to the asset directory and always uses `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    pub filename: String,
    pub data: Vec<u8>,
}

impl File {
    pub fn new(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        File {
            filename: filename.into(),
            data: data.into(),
        }
    }
}

/// Access to the concrete type behind a `dyn Asset`.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A node of the asset graph.
pub trait Asset: AsAny {
    /// Identifier this asset is registered under.
    fn id(&self) -> AssetId;

    /// Human-friendly name, used in logs and errors.
    fn name(&self) -> &str;

    /// Assets that must be resolved before this one generates.
    fn dependencies(&self) -> Vec<AssetId>;

    /// Produce the asset from its resolved dependencies.
    fn generate(&mut self, parents: &Parents<'_>) -> Result<()>;

    /// Files this asset writes to the asset directory.
    fn files(&self) -> &[File] {
        &[]
    }

    /// Reconstruct the asset from a previous run.
    ///
    /// Returns `Ok(false)` when nothing was persisted. A persisted form that
    /// fails to parse is an error, never a reason to regenerate.
    fn load(&mut self, fetcher: &dyn FileFetcher) -> Result<bool> {
        let _ = fetcher;
        Ok(false)
    }
}

/// An asset with a compile-time id, retrievable by type from [`Parents`]
/// and [`Store`].
pub trait TypedAsset: Asset + Sized + 'static {
    const ID: AssetId;
}

impl fmt::Debug for dyn Asset + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Asset")
            .field("id", &self.id())
            .field("name", &self.name())
            .finish()
    }
}
