//! Credentials, kubeconfigs and manifests produced outside this tool.
//!
//! Each provided asset is a fixed set of files (or a glob) in the asset
//! directory. They are only ever loaded; generating one fails with the list
//! of files that have to be put in place first.

use anyhow::{bail, Result};

use crate::asset::{Asset, AssetId, File, FileFetcher, Parents};

/// Where a provided asset's files come from.
#[derive(Debug, Clone, Copy)]
pub enum Source {
    /// Every listed file must be present.
    Files(&'static [&'static str]),
    /// Any files matching the glob, at least one.
    Pattern(&'static str),
}

/// Definition of one provided asset.
#[derive(Debug)]
pub struct ProvidedSpec {
    pub id: AssetId,
    pub name: &'static str,
    pub source: Source,
}

macro_rules! provided {
    ($id:literal, $name:literal, files: [$($file:literal),+ $(,)?]) => {
        ProvidedSpec {
            id: AssetId::new($id),
            name: $name,
            source: Source::Files(&[$($file),+]),
        }
    };
    ($id:literal, $name:literal, pattern: $pattern:literal) => {
        ProvidedSpec {
            id: AssetId::new($id),
            name: $name,
            source: Source::Pattern($pattern),
        }
    };
}

/// Cluster manifests and machine definitions.
pub static MANIFESTS: &[ProvidedSpec] = &[
    provided!("manifests", "Common Manifests", pattern: "manifests/*"),
    provided!("openshift-manifests", "Openshift Manifests", pattern: "openshift/*"),
    provided!("master-machines", "Master Machines", pattern: "machines/*"),
];

/// Kubeconfigs, certificates and keys.
pub static CREDENTIALS: &[ProvidedSpec] = &[
    provided!("admin-kubeconfig", "Kubeconfig Admin Client", files: ["auth/kubeconfig"]),
    provided!("kubelet-kubeconfig", "Kubeconfig Kubelet", files: ["auth/kubeconfig-kubelet"]),
    provided!("admin-kubeconfig-ca-bundle", "Certificate (admin-kubeconfig-ca-bundle)",
        files: ["tls/admin-kubeconfig-ca-bundle.crt"]),
    provided!("aggregator-ca", "Certificate (aggregator)",
        files: ["tls/aggregator-ca.crt", "tls/aggregator-ca.key"]),
    provided!("aggregator-client", "Certificate (system:kube-apiserver-proxy)",
        files: ["tls/aggregator-client.crt", "tls/aggregator-client.key"]),
    provided!("apiserver", "Certificate (kube-apiserver)",
        files: ["tls/apiserver.crt", "tls/apiserver.key"]),
    provided!("etcd-ca", "Certificate (etcd)", files: ["tls/etcd-ca.crt", "tls/etcd-ca.key"]),
    provided!("etcd-ca-bundle", "Certificate (etcd-ca-bundle)", files: ["tls/etcd-ca-bundle.crt"]),
    provided!("etcd-client", "Certificate (etcd-client)",
        files: ["tls/etcd-client.crt", "tls/etcd-client.key"]),
    provided!("etcd-metric-ca-bundle", "Certificate (etcd-metric-ca-bundle)",
        files: ["tls/etcd-metric-ca-bundle.crt"]),
    provided!("etcd-signer", "Certificate (etcd-signer)",
        files: ["tls/etcd-signer.crt", "tls/etcd-signer.key"]),
    provided!("kube-apiserver-lb-server", "Certificate (kube-apiserver-lb-server)",
        files: ["tls/kube-apiserver-lb-server.crt", "tls/kube-apiserver-lb-server.key"]),
    provided!("kube-apiserver-to-kubelet-client", "Certificate (kube-apiserver-to-kubelet-client)",
        files: ["tls/kube-apiserver-to-kubelet-client.crt", "tls/kube-apiserver-to-kubelet-client.key"]),
    provided!("kube-ca", "Certificate (kube-ca)", files: ["tls/kube-ca.crt", "tls/kube-ca.key"]),
    provided!("kubelet-client", "Certificate (kubelet-client)",
        files: ["tls/kubelet-client.crt", "tls/kubelet-client.key"]),
    provided!("machine-config-server", "Certificate (mcs)",
        files: ["tls/machine-config-server.crt", "tls/machine-config-server.key"]),
    provided!("service-account", "Key Pair (service-account.pub)",
        files: ["tls/service-account.key", "tls/service-account.pub"]),
];

/// The root certificate authority.
pub static ROOT_CA: ProvidedSpec =
    provided!("root-ca", "Root CA", files: ["tls/root-ca.crt", "tls/root-ca.key"]);

/// Client certificate for the journal gateway.
pub static JOURNAL: ProvidedSpec = provided!(
    "journal-gatewayd",
    "Certificate (journal-gatewayd)",
    files: ["tls/journal-gatewayd.crt", "tls/journal-gatewayd.key"]
);

/// Every provided asset definition.
pub fn all() -> impl Iterator<Item = &'static ProvidedSpec> {
    MANIFESTS
        .iter()
        .chain(CREDENTIALS.iter())
        .chain([&ROOT_CA, &JOURNAL])
}

/// An asset loaded verbatim from the asset directory.
#[derive(Debug)]
pub struct Provided {
    spec: &'static ProvidedSpec,
    files: Vec<File>,
}

impl Provided {
    pub fn new(spec: &'static ProvidedSpec) -> Self {
        Provided {
            spec,
            files: Vec::new(),
        }
    }

    fn load_files(&mut self, fetcher: &dyn FileFetcher, names: &[&str]) -> Result<bool> {
        let mut found = Vec::new();
        let mut missing = Vec::new();
        for name in names {
            match fetcher.fetch_optional(name)? {
                Some(file) => found.push(file),
                None => missing.push(*name),
            }
        }

        if found.is_empty() {
            return Ok(false);
        }
        if !missing.is_empty() {
            bail!(
                "\"{}\" is only partially present, missing: {}",
                self.spec.name,
                missing.join(", ")
            );
        }

        self.files = found;
        Ok(true)
    }
}

impl Asset for Provided {
    fn id(&self) -> AssetId {
        self.spec.id
    }

    fn name(&self) -> &str {
        self.spec.name
    }

    fn dependencies(&self) -> Vec<AssetId> {
        Vec::new()
    }

    fn generate(&mut self, _parents: &Parents<'_>) -> Result<()> {
        match self.spec.source {
            Source::Files(names) => bail!(
                "\"{}\" must be provided in the asset directory, missing: {}",
                self.spec.name,
                names.join(", ")
            ),
            Source::Pattern(pattern) => bail!(
                "\"{}\" must be provided in the asset directory, nothing matches `{}`",
                self.spec.name,
                pattern
            ),
        }
    }

    fn files(&self) -> &[File] {
        &self.files
    }

    fn load(&mut self, fetcher: &dyn FileFetcher) -> Result<bool> {
        match self.spec.source {
            Source::Files(names) => self.load_files(fetcher, names),
            Source::Pattern(pattern) => {
                let files = fetcher.fetch_by_pattern(pattern)?;
                if files.is_empty() {
                    return Ok(false);
                }
                self.files = files;
                Ok(true)
            }
        }
    }
}
