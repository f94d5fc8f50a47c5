//! Test utilities for Ignis unit tests.
//!
//! Provides an in-memory [`FileFetcher`], small counting assets for
//! exercising the store without touching the filesystem, and fixtures for
//! a complete bootstrap run.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{bail, Result};

use crate::asset::{
    Asset, AssetCatalog, AssetId, FetchError, File, FileFetcher, Parents, TypedAsset,
};
use crate::assets::provided::{self, Source};
use crate::assets::templates::{BOOTKUBE, BOOTKUBE_DATA_DIR};

/// In-memory file fetcher.
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    files: BTreeMap<String, Vec<u8>>,
    failing: HashSet<String>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        MemoryFetcher::default()
    }

    /// Add a persisted file.
    pub fn add_file(&mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.files.insert(name.into(), data.into());
    }

    /// Make reads of `name` fail with an I/O error other than not-found.
    pub fn fail_on(&mut self, name: impl Into<String>) {
        self.failing.insert(name.into());
    }
}

impl FileFetcher for MemoryFetcher {
    fn fetch_by_name(&self, name: &str) -> Result<File, FetchError> {
        if self.failing.contains(name) {
            return Err(FetchError::Io {
                path: PathBuf::from(name),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
            });
        }
        self.files
            .get(name)
            .map(|data| File::new(name, data.clone()))
            .ok_or_else(|| FetchError::NotFound {
                path: PathBuf::from(name),
            })
    }

    fn fetch_by_pattern(&self, pattern: &str) -> Result<Vec<File>, FetchError> {
        let pattern = glob::Pattern::new(pattern).map_err(|source| FetchError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(self
            .files
            .iter()
            .filter(|(name, _)| pattern.matches(name))
            .map(|(name, data)| File::new(name.clone(), data.clone()))
            .collect())
    }
}

/// Per-asset load and generate counts, shared between test assets.
#[derive(Debug, Clone, Default)]
pub struct Counters {
    inner: Rc<RefCell<HashMap<&'static str, (usize, usize)>>>,
}

impl Counters {
    pub fn generated(&self, id: &str) -> usize {
        self.inner.borrow().get(id).map(|c| c.0).unwrap_or(0)
    }

    pub fn loaded(&self, id: &str) -> usize {
        self.inner.borrow().get(id).map(|c| c.1).unwrap_or(0)
    }

    fn bump_generated(&self, id: &'static str) {
        self.inner.borrow_mut().entry(id).or_default().0 += 1;
    }

    fn bump_loaded(&self, id: &'static str) {
        self.inner.borrow_mut().entry(id).or_default().1 += 1;
    }
}

/// Asset with a configurable dependency list, persisted as `<id>.txt`.
pub struct TestAsset {
    id: AssetId,
    deps: Vec<AssetId>,
    counters: Counters,
    files: Vec<File>,
}

impl TestAsset {
    /// Persisted content that fails to parse.
    pub const CORRUPT: &'static str = "<corrupt>";

    pub fn new(id: &'static str, deps: &[&'static str], counters: Counters) -> Self {
        TestAsset {
            id: AssetId::new(id),
            deps: deps.iter().map(|d| AssetId::new(*d)).collect(),
            counters,
            files: Vec::new(),
        }
    }

    fn filename(&self) -> String {
        format!("{}.txt", self.id)
    }
}

impl Asset for TestAsset {
    fn id(&self) -> AssetId {
        self.id
    }

    fn name(&self) -> &str {
        self.id.as_str()
    }

    fn dependencies(&self) -> Vec<AssetId> {
        self.deps.clone()
    }

    fn generate(&mut self, parents: &Parents<'_>) -> Result<()> {
        self.counters.bump_generated(self.id.as_str());

        let mut content = format!("generated {}", self.id);
        for dep in parents.declared() {
            let parent = parents.get_dyn(*dep)?;
            content.push_str(&format!(" <- {}", parent.name()));
        }
        self.files = vec![File::new(self.filename(), content)];
        Ok(())
    }

    fn files(&self) -> &[File] {
        &self.files
    }

    fn load(&mut self, fetcher: &dyn FileFetcher) -> Result<bool> {
        self.counters.bump_loaded(self.id.as_str());

        let Some(file) = fetcher.fetch_optional(&self.filename())? else {
            return Ok(false);
        };
        if file.data == Self::CORRUPT.as_bytes() {
            bail!("failed to parse {}", file.filename);
        }
        self.files = vec![file];
        Ok(true)
    }
}

/// Build a catalog of [`TestAsset`]s from `(id, dependencies)` pairs.
pub fn catalog_of(counters: &Counters, specs: &[(&'static str, &[&'static str])]) -> AssetCatalog {
    let mut catalog = AssetCatalog::new();
    for &(id, deps) in specs {
        let counters = counters.clone();
        let deps = deps.to_vec();
        catalog.register(AssetId::new(id), move || {
            Box::new(TestAsset::new(id, &deps, counters.clone()))
        });
    }
    catalog
}

pub const TEST_LEAF: AssetId = AssetId::new("test-leaf");

/// Typed leaf asset.
#[derive(Debug, Default)]
pub struct TestLeaf {
    pub value: String,
}

impl TypedAsset for TestLeaf {
    const ID: AssetId = TEST_LEAF;
}

impl Asset for TestLeaf {
    fn id(&self) -> AssetId {
        Self::ID
    }

    fn name(&self) -> &str {
        "Test Leaf"
    }

    fn dependencies(&self) -> Vec<AssetId> {
        Vec::new()
    }

    fn generate(&mut self, _parents: &Parents<'_>) -> Result<()> {
        self.value = "generated".to_string();
        Ok(())
    }
}

/// Install config for a three-replica bare-metal cluster `demo.example.com`.
pub const SAMPLE_INSTALL_CONFIG: &str = r#"
cluster_name = "demo"
base_domain = "example.com"
ssh_key = "ssh-ed25519 AAAA core@example"
pull_secret = '{"auths":{}}'

[platform.baremetal]
"#;

/// One file for every provided asset, as `(name, contents)`.
///
/// Glob-sourced assets get a single `cluster-config.yaml`.
pub fn provided_files() -> Vec<(String, String)> {
    let mut files = Vec::new();
    for spec in provided::all() {
        match spec.source {
            Source::Files(names) => {
                for name in names {
                    files.push((name.to_string(), format!("{} contents", name)));
                }
            }
            Source::Pattern(pattern) => {
                let dir = pattern.trim_end_matches("/*");
                files.push((format!("{}/cluster-config.yaml", dir), "kind: Config\n".to_string()));
            }
        }
    }
    files
}

/// Put a file in place for every provided asset.
pub fn populate_provided(fetcher: &mut MemoryFetcher) {
    for (name, contents) in provided_files() {
        fetcher.add_file(name, contents);
    }
}

/// Write a complete asset directory: install config plus provided files.
pub fn write_asset_dir(root: &Path) {
    fs::write(root.join("install-config.toml"), SAMPLE_INSTALL_CONFIG).unwrap();
    for (name, contents) in provided_files() {
        let path = root.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
}

/// Write a small bootstrap data directory below `root`.
pub fn write_data_dir(root: &Path) {
    let files = [
        ("bootstrap/files/etc/etcd.env.template", "ETCD_CLUSTER={{.EtcdCluster}}\n"),
        ("bootstrap/files/etc/motd", "This is the bootstrap node.\n"),
        (
            "bootstrap/files/usr/local/bin/bootkube.sh.template",
            "#!/bin/sh\nexec podman run {{.ReleaseImage}}\n",
        ),
        ("bootstrap/systemd/units/bootkube.service", "[Unit]\nDescription=Bootstrap\n"),
        (
            "bootstrap/systemd/units/kubelet.service.template",
            "[Service]\nEnvironment=PULL_SECRET={{.PullSecret}}\n",
        ),
        (
            "bootstrap/systemd/units/crio.service.d/10-image.conf.template",
            "[Service]\nEnvironment=IMAGE={{.EtcdCertSignerImage}}\n",
        ),
    ];

    for (rel, contents) in files {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    let bootkube = root.join(BOOTKUBE_DATA_DIR);
    fs::create_dir_all(&bootkube).unwrap();
    for spec in BOOTKUBE {
        fs::write(bootkube.join(spec.filename), format!("# {}\n", spec.name)).unwrap();
    }
}
