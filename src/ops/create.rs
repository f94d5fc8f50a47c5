//! Implementation of `ignis create`.

use std::path::PathBuf;

use anyhow::{bail, Result};
use tracing::debug;

use crate::asset::{persist_to_dir, AssetCatalog, AssetId, AssetSource, DiskFetcher, Store};
use crate::assets::{self, BootstrapSettings};
use crate::util::fs::ensure_dir;

/// Options for the create command.
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// Directory assets are loaded from and written to
    pub dir: PathBuf,

    /// Asset ids to create (empty = default targets)
    pub targets: Vec<String>,

    /// Settings for the bootstrap config
    pub settings: BootstrapSettings,
}

/// One asset resolved during a create run.
#[derive(Debug, Clone)]
pub struct CreatedAsset {
    pub id: AssetId,
    pub name: String,
    pub source: AssetSource,
    pub files: Vec<PathBuf>,
}

/// Result of a create run.
#[derive(Debug, Clone, Default)]
pub struct CreateResult {
    /// Every resolved asset, dependencies first
    pub assets: Vec<CreatedAsset>,
}

impl CreateResult {
    pub fn generated(&self) -> impl Iterator<Item = &CreatedAsset> {
        self.assets
            .iter()
            .filter(|a| a.source == AssetSource::Generated)
    }

    pub fn loaded(&self) -> impl Iterator<Item = &CreatedAsset> {
        self.assets.iter().filter(|a| a.source == AssetSource::Loaded)
    }

    pub fn written(&self) -> impl Iterator<Item = &PathBuf> {
        self.assets.iter().flat_map(|a| a.files.iter())
    }
}

/// Map requested target names onto catalog ids.
///
/// This prevents silently creating nothing when a name is misspelled.
fn select_targets(catalog: &AssetCatalog, targets: &[String]) -> Result<Vec<AssetId>> {
    if targets.is_empty() {
        return Ok(assets::default_targets());
    }

    let mut selected = Vec::new();
    for requested in targets {
        match catalog.ids().find(|id| id.as_str() == requested) {
            Some(id) => selected.push(id),
            None => bail!(
                "unknown asset `{}`\n\
                 available assets: {}\n\
                 hint: use `ignis graph --list` to see all assets",
                requested,
                catalog
                    .ids()
                    .map(|id| id.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }

    Ok(selected)
}

/// Resolve the requested assets and write every resolved asset to disk.
pub fn create(opts: &CreateOptions) -> Result<CreateResult> {
    let catalog = assets::catalog(&opts.settings);
    catalog.validate()?;

    let targets = select_targets(&catalog, &opts.targets)?;
    ensure_dir(&opts.dir)?;

    let fetcher = DiskFetcher::new(&opts.dir);
    let mut store = Store::new(&catalog, &fetcher);

    for id in &targets {
        debug!("Fetching {}", id);
        store.fetch(*id)?;
    }

    let mut result = CreateResult::default();
    for &id in store.resolution_order() {
        let Some(asset) = store.get(id) else {
            continue;
        };
        let Some(source) = store.source(id) else {
            continue;
        };

        let files = persist_to_dir(asset, &opts.dir)?;
        debug!(
            "{} {} ({} file{})",
            match source {
                AssetSource::Loaded => "Loaded",
                AssetSource::Generated => "Generated",
            },
            asset.name(),
            files.len(),
            if files.len() == 1 { "" } else { "s" }
        );

        result.assets.push(CreatedAsset {
            id,
            name: asset.name().to_string(),
            source,
            files,
        });
    }

    Ok(result)
}
