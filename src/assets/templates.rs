//! Raw manifest templates copied from the data directory.
//!
//! These are not rendered here. They are stored under `templates/` in the
//! asset directory so that later manifest generation (and the user) can
//! edit them before they are consumed.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::asset::{Asset, AssetId, File, FileFetcher, Parents};

/// Asset directory prefix for template content.
pub const TEMPLATE_DIR: &str = "templates";

/// Data directory holding the bootkube templates.
pub const BOOTKUBE_DATA_DIR: &str = "manifests/bootkube";

/// One template file.
#[derive(Debug)]
pub struct TemplateSpec {
    pub id: AssetId,
    pub name: &'static str,
    pub filename: &'static str,
}

pub static BOOTKUBE: &[TemplateSpec] = &[
    TemplateSpec {
        id: AssetId::new("etcd-ca-bundle-configmap"),
        name: "EtcdCAConfigMap",
        filename: "etcd-ca-bundle-configmap.yaml.template",
    },
    TemplateSpec {
        id: AssetId::new("openshift-config-secret-etcd-metric-client"),
        name: "OpenshiftConfigSecretEtcdMetricClient",
        filename: "openshift-config-secret-etcd-metric-client.yaml.template",
    },
];

/// A template copied verbatim from the data directory.
#[derive(Debug)]
pub struct TemplateContent {
    spec: &'static TemplateSpec,
    data_dir: PathBuf,
    files: Vec<File>,
}

impl TemplateContent {
    pub fn new(spec: &'static TemplateSpec, data_dir: impl Into<PathBuf>) -> Self {
        TemplateContent {
            spec,
            data_dir: data_dir.into(),
            files: Vec::new(),
        }
    }

    fn asset_filename(&self) -> String {
        format!("{}/{}", TEMPLATE_DIR, self.spec.filename)
    }
}

impl Asset for TemplateContent {
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
        let source = self
            .data_dir
            .join(BOOTKUBE_DATA_DIR)
            .join(self.spec.filename);
        let data = fs::read(&source)
            .with_context(|| format!("failed to read template {}", source.display()))?;
        self.files = vec![File::new(self.asset_filename(), data)];
        Ok(())
    }

    fn files(&self) -> &[File] {
        &self.files
    }

    fn load(&mut self, fetcher: &dyn FileFetcher) -> Result<bool> {
        match fetcher.fetch_optional(&self.asset_filename())? {
            Some(file) => {
                self.files = vec![file];
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryFetcher;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_generate_copies_template() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join(BOOTKUBE_DATA_DIR);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(BOOTKUBE[0].filename), "kind: ConfigMap\n{{.EtcdCaCert}}\n").unwrap();

        let mut asset = TemplateContent::new(&BOOTKUBE[0], tmp.path());
        let resolved = HashMap::new();
        asset.generate(&Parents::new("t", &[], &resolved)).unwrap();

        let file = &asset.files()[0];
        assert_eq!(file.filename, "templates/etcd-ca-bundle-configmap.yaml.template");
        assert_eq!(file.data, b"kind: ConfigMap\n{{.EtcdCaCert}}\n");
    }

    #[test]
    fn test_load_prefers_edited_copy() {
        let mut fetcher = MemoryFetcher::new();
        fetcher.add_file(
            "templates/openshift-config-secret-etcd-metric-client.yaml.template",
            "edited",
        );

        let mut asset = TemplateContent::new(&BOOTKUBE[1], "/nonexistent");
        assert!(asset.load(&fetcher).unwrap());
        assert_eq!(asset.files()[0].data, b"edited");
    }
}
