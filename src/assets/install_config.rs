//! The user's install configuration.

use anyhow::{bail, Context, Result};

use crate::asset::{Asset, AssetId, File, FileFetcher, Parents, TypedAsset};
use crate::types::InstallConfigSpec;

/// Name of the install configuration in the asset directory.
pub const INSTALL_CONFIG_FILENAME: &str = "install-config.toml";

/// Install configuration, read from `install-config.toml`.
///
/// This is user input. It can be loaded but never generated.
#[derive(Debug, Default)]
pub struct InstallConfig {
    config: Option<InstallConfigSpec>,
    files: Vec<File>,
}

impl InstallConfig {
    /// The parsed configuration, once resolved.
    pub fn config(&self) -> Option<&InstallConfigSpec> {
        self.config.as_ref()
    }
}

impl TypedAsset for InstallConfig {
    const ID: AssetId = super::INSTALL_CONFIG;
}

impl Asset for InstallConfig {
    fn id(&self) -> AssetId {
        Self::ID
    }

    fn name(&self) -> &str {
        "Install Config"
    }

    fn dependencies(&self) -> Vec<AssetId> {
        Vec::new()
    }

    fn generate(&mut self, _parents: &Parents<'_>) -> Result<()> {
        bail!(
            "{} not found in the asset directory; create it before running `ignis create`",
            INSTALL_CONFIG_FILENAME
        )
    }

    fn files(&self) -> &[File] {
        &self.files
    }

    fn load(&mut self, fetcher: &dyn FileFetcher) -> Result<bool> {
        let Some(file) = fetcher.fetch_optional(INSTALL_CONFIG_FILENAME)? else {
            return Ok(false);
        };

        let text = std::str::from_utf8(&file.data)
            .with_context(|| format!("{} is not valid UTF-8", INSTALL_CONFIG_FILENAME))?;
        let spec: InstallConfigSpec = toml::from_str(text)
            .with_context(|| format!("failed to parse {}", INSTALL_CONFIG_FILENAME))?;

        self.config = Some(spec);
        self.files = vec![file];
        Ok(true)
    }
}
