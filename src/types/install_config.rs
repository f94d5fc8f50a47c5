//! User-supplied cluster install configuration.

use serde::{Deserialize, Serialize};

use crate::types::metadata::{
    AwsMetadata, BareMetalMetadata, LibvirtMetadata, OpenStackMetadata, PlatformMetadata,
};

/// Port every etcd member serves clients on.
pub const ETCD_CLIENT_PORT: u16 = 2379;

/// Contents of `install-config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallConfigSpec {
    /// Cluster name, the first label of the cluster domain.
    pub cluster_name: String,

    /// Base DNS domain of the cluster.
    pub base_domain: String,

    /// Public SSH key authorized for the `core` user.
    #[serde(default)]
    pub ssh_key: String,

    /// Registry credentials handed to the bootstrap machine.
    #[serde(default)]
    pub pull_secret: String,

    #[serde(default)]
    pub control_plane: ControlPlane,

    #[serde(default)]
    pub platform: Platform,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlPlane {
    #[serde(default = "default_replicas")]
    pub replicas: u32,
}

fn default_replicas() -> u32 {
    3
}

impl Default for ControlPlane {
    fn default() -> Self {
        ControlPlane {
            replicas: default_replicas(),
        }
    }
}

/// Install-time platform settings. At most one section is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws: Option<AwsPlatform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub libvirt: Option<LibvirtPlatform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openstack: Option<OpenStackPlatform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baremetal: Option<BareMetalPlatform>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwsPlatform {
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibvirtPlatform {
    #[serde(default = "default_libvirt_uri")]
    pub uri: String,
}

fn default_libvirt_uri() -> String {
    "qemu+tcp://192.168.122.1/system".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenStackPlatform {
    pub region: String,
    pub cloud: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BareMetalPlatform {}

impl InstallConfigSpec {
    /// `<cluster_name>.<base_domain>`
    pub fn cluster_domain(&self) -> String {
        format!("{}.{}", self.cluster_name, self.base_domain)
    }

    /// Client URLs of every etcd member, one per control-plane replica.
    pub fn etcd_endpoints(&self) -> Vec<String> {
        etcd_endpoints(self.control_plane.replicas, &self.cluster_domain())
    }

    /// Platform metadata recorded for teardown.
    pub fn platform_metadata(&self, infra_id: &str) -> PlatformMetadata {
        let identifier = || {
            [(format!("kubernetes.io/cluster/{}", infra_id), "owned".to_string())]
                .into_iter()
                .collect()
        };
        let p = &self.platform;
        PlatformMetadata {
            aws: p.aws.as_ref().map(|aws| AwsMetadata {
                region: aws.region.clone(),
                identifier: identifier(),
            }),
            libvirt: p.libvirt.as_ref().map(|libvirt| LibvirtMetadata {
                uri: libvirt.uri.clone(),
            }),
            openstack: p.openstack.as_ref().map(|os| OpenStackMetadata {
                region: os.region.clone(),
                cloud: os.cloud.clone(),
                identifier: identifier(),
            }),
            baremetal: p.baremetal.as_ref().map(|_| BareMetalMetadata {}),
        }
    }
}

/// `https://etcd-<i>.<domain>:2379` for `i` in `0..replicas`.
pub fn etcd_endpoints(replicas: u32, domain: &str) -> Vec<String> {
    (0..replicas)
        .map(|i| format!("https://etcd-{}.{}:{}", i, domain, ETCD_CLIENT_PORT))
        .collect()
}
