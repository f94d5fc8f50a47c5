//! Store - memoized, dependency-ordered asset resolution.
//!
//! Resolution is a single synchronous depth-first pass. Each asset id is
//! loaded or generated at most once per store; later requests return the
//! same in-memory value.

use std::collections::HashMap;
use std::error::Error as StdError;

use thiserror::Error;
use tracing::{debug, info};

use crate::asset::{Asset, AssetCatalog, AssetId, FileFetcher, Parents, TypedAsset};

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Error while resolving the asset graph.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("no asset registered for `{id}`")]
    UnknownAsset { id: AssetId },

    #[error("cycle detected in asset graph: {}", format_chain(.chain))]
    CycleDetected { chain: Vec<AssetId> },

    #[error("failed to load asset \"{asset}\"")]
    Load {
        asset: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to generate asset \"{asset}\"")]
    Generate {
        asset: String,
        #[source]
        source: BoxError,
    },

    #[error("asset \"{asset}\" did not declare a dependency on `{dependency}`")]
    UndeclaredDependency { asset: String, dependency: AssetId },

    #[error("asset `{id}` has not been resolved")]
    NotResolved { id: AssetId },

    #[error("asset `{id}` is not a {expected}")]
    TypeMismatch {
        id: AssetId,
        expected: &'static str,
    },
}

fn format_chain(chain: &[AssetId]) -> String {
    chain
        .iter()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// How a resolved asset was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetSource {
    /// Reconstructed from a previous run's files.
    Loaded,
    /// Computed from its dependencies.
    Generated,
}

/// The dependency store.
///
/// Owns every asset it resolved. Assets are immutable once inserted.
pub struct Store<'a> {
    catalog: &'a AssetCatalog,
    fetcher: &'a dyn FileFetcher,
    assets: HashMap<AssetId, Box<dyn Asset>>,
    sources: HashMap<AssetId, AssetSource>,
    order: Vec<AssetId>,
    in_progress: Vec<AssetId>,
}

impl<'a> Store<'a> {
    pub fn new(catalog: &'a AssetCatalog, fetcher: &'a dyn FileFetcher) -> Self {
        Store {
            catalog,
            fetcher,
            assets: HashMap::new(),
            sources: HashMap::new(),
            order: Vec::new(),
            in_progress: Vec::new(),
        }
    }

    /// Resolve `id` and everything it depends on.
    pub fn fetch(&mut self, id: AssetId) -> Result<&dyn Asset, GraphError> {
        self.resolve(id)?;
        self.get(id).ok_or(GraphError::NotResolved { id })
    }

    /// Resolve an asset by type.
    pub fn fetch_typed<T: TypedAsset>(&mut self) -> Result<&T, GraphError> {
        self.fetch(T::ID)?
            .as_any()
            .downcast_ref::<T>()
            .ok_or_else(|| GraphError::TypeMismatch {
                id: T::ID,
                expected: std::any::type_name::<T>(),
            })
    }

    /// An already-resolved asset.
    pub fn get(&self, id: AssetId) -> Option<&dyn Asset> {
        self.assets.get(&id).map(|asset| asset.as_ref())
    }

    /// Whether the asset was loaded or generated, if resolved.
    pub fn source(&self, id: AssetId) -> Option<AssetSource> {
        self.sources.get(&id).copied()
    }

    /// Resolved ids, dependencies before dependents.
    pub fn resolution_order(&self) -> &[AssetId] {
        &self.order
    }

    /// Resolved assets, dependencies before dependents.
    pub fn resolved(&self) -> impl Iterator<Item = &dyn Asset> + '_ {
        self.order.iter().filter_map(move |id| self.get(*id))
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    fn resolve(&mut self, id: AssetId) -> Result<(), GraphError> {
        if self.assets.contains_key(&id) {
            return Ok(());
        }

        if let Some(start) = self.in_progress.iter().position(|p| *p == id) {
            let mut chain = self.in_progress[start..].to_vec();
            chain.push(id);
            return Err(GraphError::CycleDetected { chain });
        }

        let mut asset = self
            .catalog
            .construct(id)
            .ok_or(GraphError::UnknownAsset { id })?;

        self.in_progress.push(id);
        let result = self.resolve_asset(id, asset.as_mut());
        self.in_progress.pop();
        let source = result?;

        self.assets.insert(id, asset);
        self.sources.insert(id, source);
        self.order.push(id);
        Ok(())
    }

    fn resolve_asset(&mut self, id: AssetId, asset: &mut dyn Asset) -> Result<AssetSource, GraphError> {
        let dependencies = asset.dependencies();
        for dep in &dependencies {
            debug!("Fetching dependency `{}` of \"{}\"", dep, asset.name());
            self.resolve(*dep)?;
        }

        let found = asset
            .load(self.fetcher)
            .map_err(|e| GraphError::Load {
                asset: asset.name().to_string(),
                source: e.into(),
            })?;
        if found {
            info!("Loaded \"{}\" ({}) from disk", asset.name(), id);
            return Ok(AssetSource::Loaded);
        }

        debug!("Generating \"{}\" ({})", asset.name(), id);
        let name = asset.name().to_string();
        let parents = Parents::new(&name, &dependencies, &self.assets);
        asset.generate(&parents).map_err(|e| GraphError::Generate {
            asset: name.clone(),
            source: e.into(),
        })?;

        Ok(AssetSource::Generated)
    }
}
