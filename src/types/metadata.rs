//! Cluster metadata persisted for teardown.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Metadata that cannot be acted on.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetadataError {
    #[error("metadata configures more than one platform: {}", .platforms.join(", "))]
    MultiplePlatforms { platforms: Vec<&'static str> },
}

/// Information about a created cluster, written to `metadata.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterMetadata {
    #[serde(rename = "clusterName")]
    pub cluster_name: String,
    #[serde(rename = "clusterID")]
    pub cluster_id: String,
    #[serde(flatten)]
    pub platform: PlatformMetadata,
}

/// Per-platform teardown data. Exactly one field should be set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws: Option<AwsMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openstack: Option<OpenStackMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub libvirt: Option<LibvirtMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baremetal: Option<BareMetalMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwsMetadata {
    pub region: String,
    #[serde(default)]
    pub identifier: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenStackMetadata {
    pub region: String,
    pub cloud: String,
    #[serde(default)]
    pub identifier: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibvirtMetadata {
    pub uri: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BareMetalMetadata {}

impl PlatformMetadata {
    /// Name of the configured platform, if any.
    pub fn platform(&self) -> Option<&'static str> {
        self.configured().into_iter().next()
    }

    /// Names of every populated variant, in lookup order.
    pub fn configured(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.aws.is_some() {
            names.push("aws");
        }
        if self.libvirt.is_some() {
            names.push("libvirt");
        }
        if self.openstack.is_some() {
            names.push("openstack");
        }
        if self.baremetal.is_some() {
            names.push("baremetal");
        }
        names
    }

    /// Reject metadata with more than one populated variant.
    pub fn validate(&self) -> Result<(), MetadataError> {
        let platforms = self.configured();
        if platforms.len() > 1 {
            return Err(MetadataError::MultiplePlatforms { platforms });
        }
        Ok(())
    }
}

impl ClusterMetadata {
    pub fn platform(&self) -> Option<&'static str> {
        self.platform.platform()
    }

    pub fn validate(&self) -> Result<(), MetadataError> {
        self.platform.validate()
    }
}
