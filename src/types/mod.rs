//! Configuration and metadata types shared across assets and teardown.

pub mod install_config;
pub mod metadata;

pub use install_config::{etcd_endpoints, InstallConfigSpec, Platform};
pub use metadata::{ClusterMetadata, MetadataError, PlatformMetadata};
