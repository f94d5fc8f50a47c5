//! Cluster metadata, written for teardown.

use anyhow::{Context, Result};
use uuid::Uuid;

use crate::asset::{Asset, AssetId, File, FileFetcher, Parents, TypedAsset};
use crate::assets::InstallConfig;
use crate::types::ClusterMetadata;

/// Name of the metadata file in the asset directory.
pub const METADATA_FILENAME: &str = "metadata.json";

/// Length of the random suffix of the infrastructure id.
const INFRA_ID_SUFFIX_LEN: usize = 5;

/// `metadata.json`: cluster name, cluster id and platform teardown data.
#[derive(Debug, Default)]
pub struct Metadata {
    metadata: Option<ClusterMetadata>,
    files: Vec<File>,
}

impl Metadata {
    pub fn metadata(&self) -> Option<&ClusterMetadata> {
        self.metadata.as_ref()
    }
}

impl TypedAsset for Metadata {
    const ID: AssetId = super::METADATA;
}

impl Asset for Metadata {
    fn id(&self) -> AssetId {
        Self::ID
    }

    fn name(&self) -> &str {
        "Metadata"
    }

    fn dependencies(&self) -> Vec<AssetId> {
        vec![InstallConfig::ID]
    }

    fn generate(&mut self, parents: &Parents<'_>) -> Result<()> {
        let install = parents
            .get::<InstallConfig>()?
            .config()
            .context("install config is empty")?;

        let cluster_id = Uuid::new_v4();
        let suffix: String = cluster_id
            .simple()
            .to_string()
            .chars()
            .take(INFRA_ID_SUFFIX_LEN)
            .collect();
        let infra_id = format!("{}-{}", install.cluster_name, suffix);

        let metadata = ClusterMetadata {
            cluster_name: install.cluster_name.clone(),
            cluster_id: cluster_id.to_string(),
            platform: install.platform_metadata(&infra_id),
        };

        let data = serde_json::to_vec(&metadata).context("failed to serialize cluster metadata")?;
        self.files = vec![File::new(METADATA_FILENAME, data)];
        self.metadata = Some(metadata);
        Ok(())
    }

    fn files(&self) -> &[File] {
        &self.files
    }

    fn load(&mut self, fetcher: &dyn FileFetcher) -> Result<bool> {
        let Some(file) = fetcher.fetch_optional(METADATA_FILENAME)? else {
            return Ok(false);
        };

        let metadata: ClusterMetadata = serde_json::from_slice(&file.data)
            .with_context(|| format!("failed to parse {}", METADATA_FILENAME))?;

        self.metadata = Some(metadata);
        self.files = vec![file];
        Ok(true)
    }
}
