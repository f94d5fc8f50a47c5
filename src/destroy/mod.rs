//! Cluster teardown.
//!
//! The platform recorded in `metadata.json` selects a destroyer from a
//! [`DestroyerRegistry`]. The registry is built by the caller and passed in;
//! there is no process-wide table.

pub mod baremetal;

use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use thiserror::Error;
use tracing::{debug, info_span, Span};

use crate::assets::metadata::METADATA_FILENAME;
use crate::types::{ClusterMetadata, MetadataError};

/// Tears down every resource provisioned for one cluster.
pub trait Destroyer {
    fn run(&mut self) -> Result<()>;
}

/// Builds a destroyer for a cluster. The span is the destroyer's logger.
pub type Creator = fn(Span, &ClusterMetadata) -> Result<Box<dyn Destroyer>>;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Error selecting or constructing a destroyer.
#[derive(Debug, Error)]
pub enum DestroyError {
    #[error("no platform configured in metadata")]
    NoPlatform,

    #[error(transparent)]
    InvalidMetadata(#[from] MetadataError),

    #[error("no destroyers registered for \"{platform}\"")]
    NotRegistered { platform: String },

    #[error("failed to read cluster metadata from {}", .path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("failed to create destroyer for \"{platform}\"")]
    Create {
        platform: String,
        #[source]
        source: BoxError,
    },
}

/// Platform name to destroyer constructor.
#[derive(Clone, Default)]
pub struct DestroyerRegistry {
    creators: BTreeMap<String, Creator>,
}

impl fmt::Debug for DestroyerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.creators.keys()).finish()
    }
}

impl DestroyerRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        DestroyerRegistry::default()
    }

    /// A registry with every destroyer compiled into this crate.
    pub fn with_builtin() -> Self {
        let mut registry = DestroyerRegistry::new();
        registry.register(baremetal::PLATFORM, baremetal::new);
        registry
    }

    /// Register a creator. Re-registering a platform replaces it.
    pub fn register(&mut self, platform: impl Into<String>, creator: Creator) {
        self.creators.insert(platform.into(), creator);
    }

    pub fn contains(&self, platform: &str) -> bool {
        self.creators.contains_key(platform)
    }

    /// Registered platform names, sorted.
    pub fn platforms(&self) -> impl Iterator<Item = &str> + '_ {
        self.creators.keys().map(String::as_str)
    }

    /// Select and construct the destroyer for `metadata`.
    pub fn dispatch(&self, metadata: &ClusterMetadata) -> Result<Box<dyn Destroyer>, DestroyError> {
        metadata.validate()?;
        let platform = metadata.platform().ok_or(DestroyError::NoPlatform)?;

        let creator = self
            .creators
            .get(platform)
            .ok_or_else(|| DestroyError::NotRegistered {
                platform: platform.to_string(),
            })?;

        debug!("Creating {} destroyer for cluster {}", platform, metadata.cluster_name);
        let span = info_span!("destroy", platform, cluster = %metadata.cluster_name);
        creator(span, metadata).map_err(|e| DestroyError::Create {
            platform: platform.to_string(),
            source: e.into(),
        })
    }
}

/// Read the cluster metadata written to `dir`.
pub fn load_metadata(dir: &Path) -> Result<ClusterMetadata, DestroyError> {
    let path = dir.join(METADATA_FILENAME);
    let data = std::fs::read(&path).map_err(|e| DestroyError::Metadata {
        path: path.clone(),
        source: Box::new(e),
    })?;
    serde_json::from_slice(&data).map_err(|e| DestroyError::Metadata {
        path,
        source: Box::new(e),
    })
}

/// The destroyer for the cluster whose assets live in `dir`.
pub fn new(registry: &DestroyerRegistry, dir: &Path) -> Result<Box<dyn Destroyer>, DestroyError> {
    let metadata = load_metadata(dir)?;
    registry.dispatch(&metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::metadata::{BareMetalMetadata, OpenStackMetadata, PlatformMetadata};
    use std::fs;
    use tempfile::TempDir;

    struct FakeDestroyer;

    impl Destroyer for FakeDestroyer {
        fn run(&mut self) -> Result<()> {
            anyhow::bail!("fake openstack destroyer")
        }
    }

    fn fake_openstack(_span: Span, metadata: &ClusterMetadata) -> Result<Box<dyn Destroyer>> {
        assert!(metadata.platform.openstack.is_some());
        Ok(Box::new(FakeDestroyer))
    }

    fn failing_creator(_span: Span, _metadata: &ClusterMetadata) -> Result<Box<dyn Destroyer>> {
        anyhow::bail!("missing credentials")
    }

    fn openstack_metadata() -> ClusterMetadata {
        ClusterMetadata {
            cluster_name: "demo".to_string(),
            cluster_id: "id".to_string(),
            platform: PlatformMetadata {
                openstack: Some(OpenStackMetadata {
                    region: "RegionOne".to_string(),
                    cloud: "mycloud".to_string(),
                    identifier: BTreeMap::new(),
                }),
                ..PlatformMetadata::default()
            },
        }
    }

    #[test]
    fn test_dispatch_selects_platform() {
        let mut registry = DestroyerRegistry::new();
        registry.register("openstack", fake_openstack);

        let mut destroyer = registry.dispatch(&openstack_metadata()).unwrap();
        let err = destroyer.run().unwrap_err();
        assert_eq!(err.to_string(), "fake openstack destroyer");
    }

    #[test]
    fn test_no_platform() {
        let registry = DestroyerRegistry::with_builtin();
        let mut metadata = openstack_metadata();
        metadata.platform = PlatformMetadata::default();

        let err = registry.dispatch(&metadata).err().unwrap();
        assert!(matches!(err, DestroyError::NoPlatform));
    }

    #[test]
    fn test_not_registered() {
        let registry = DestroyerRegistry::with_builtin();

        let err = registry.dispatch(&openstack_metadata()).err().unwrap();
        assert!(matches!(err, DestroyError::NotRegistered { ref platform } if platform == "openstack"));
        assert_eq!(err.to_string(), "no destroyers registered for \"openstack\"");
    }

    #[test]
    fn test_multiple_platforms_rejected() {
        let registry = DestroyerRegistry::with_builtin();
        let mut metadata = openstack_metadata();
        metadata.platform.baremetal = Some(BareMetalMetadata {});

        let err = registry.dispatch(&metadata).err().unwrap();
        assert!(matches!(err, DestroyError::InvalidMetadata(_)));
    }

    #[test]
    fn test_creator_error_is_wrapped() {
        let mut registry = DestroyerRegistry::new();
        registry.register("openstack", failing_creator);

        let err = registry.dispatch(&openstack_metadata()).err().unwrap();
        assert!(matches!(err, DestroyError::Create { .. }));
    }

    #[test]
    fn test_new_reads_metadata_json() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(METADATA_FILENAME),
            r#"{"clusterName":"demo","clusterID":"id","baremetal":{}}"#,
        )
        .unwrap();

        let registry = DestroyerRegistry::with_builtin();
        let mut destroyer = new(&registry, tmp.path()).unwrap();
        destroyer.run().unwrap();
    }

    #[test]
    fn test_new_without_metadata() {
        let tmp = TempDir::new().unwrap();
        let err = new(&DestroyerRegistry::with_builtin(), tmp.path()).err().unwrap();
        assert!(matches!(err, DestroyError::Metadata { .. }));
    }

    #[test]
    fn test_registry_platforms() {
        let mut registry = DestroyerRegistry::with_builtin();
        registry.register("openstack", fake_openstack);

        assert!(registry.contains("baremetal"));
        assert_eq!(registry.platforms().collect::<Vec<_>>(), vec!["baremetal", "openstack"]);
    }
}
