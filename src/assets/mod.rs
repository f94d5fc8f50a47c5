//! Concrete assets and the catalog wiring them together.

pub mod bootstrap;
pub mod install_config;
pub mod metadata;
pub mod provided;
pub mod templates;

pub use bootstrap::{Bootstrap, BootstrapSettings};
pub use install_config::InstallConfig;
pub use metadata::Metadata;
pub use provided::Provided;
pub use templates::TemplateContent;

use crate::asset::{AssetCatalog, AssetId};

pub const INSTALL_CONFIG: AssetId = AssetId::new("install-config");
pub const METADATA: AssetId = AssetId::new("cluster-metadata");
pub const BOOTSTRAP: AssetId = AssetId::new("bootstrap-ignition");

/// Build the catalog of every known asset.
///
/// This is the composition root: all settings an asset needs are captured
/// by its constructor here.
pub fn catalog(settings: &BootstrapSettings) -> AssetCatalog {
    let mut catalog = AssetCatalog::new();

    catalog.register(INSTALL_CONFIG, || Box::new(InstallConfig::default()));
    catalog.register(METADATA, || Box::new(Metadata::default()));

    for spec in provided::all() {
        catalog.register(spec.id, move || Box::new(Provided::new(spec)));
    }

    for spec in templates::BOOTKUBE {
        let data_dir = settings.data_dir.clone();
        catalog.register(spec.id, move || {
            Box::new(TemplateContent::new(spec, data_dir.clone()))
        });
    }

    let settings = settings.clone();
    catalog.register(BOOTSTRAP, move || Box::new(Bootstrap::new(settings.clone())));

    catalog
}

/// Assets `ignis create` produces when no target is named.
pub fn default_targets() -> Vec<AssetId> {
    let mut targets = vec![METADATA, BOOTSTRAP];
    targets.extend(templates::BOOTKUBE.iter().map(|spec| spec.id));
    targets
}
