//! The bootstrap machine's config.
//!
//! Combines the rendered data directory with the files of every credential
//! and manifest asset into one bundle, written to `bootstrap.ign`.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, warn};

use crate::asset::{Asset, AssetId, File, FileFetcher, Parents, TypedAsset};
use crate::assets::provided::{self, ProvidedSpec};
use crate::assets::InstallConfig;
use crate::bundle::{self, files_from_asset, PasswdUser, StorageFile};
use crate::template::{DataDir, TemplateContext};
use crate::types::InstallConfigSpec;

/// Name of the bundle in the asset directory.
pub const BOOTSTRAP_IGN_FILENAME: &str = "bootstrap.ign";

/// Where asset files are placed on the bootstrap machine.
pub const ROOT_DIR: &str = "/opt/ignis";

/// Environment variable replacing the release image.
pub const RELEASE_IMAGE_OVERRIDE_ENV: &str = "IGNIS_RELEASE_IMAGE_OVERRIDE";

pub const DEFAULT_RELEASE_IMAGE: &str =
    "registry.svc.ci.openshift.org/openshift/origin-release:v4.0";

pub const ETCD_CERT_SIGNER_IMAGE: &str =
    "quay.io/coreos/kube-etcd-signer-server:678cc8e6841e2121ebfdb6e2db568fce290b67d6";

/// Login user carrying the install config's SSH key.
pub const LOGIN_USER: &str = "core";

/// Units enabled on the bootstrap machine.
pub const ENABLED_UNITS: &[&str] = &[
    "progress.service",
    "kubelet.service",
    "keepalived.service",
    "systemd-journal-gatewayd.socket",
];

const FILES_URI: &str = "bootstrap/files";
const UNITS_URI: &str = "bootstrap/systemd/units";

const FILE_OWNER: &str = "root";
const JOURNAL_OWNER: &str = "systemd-journal-gateway";
const MANIFEST_MODE: u32 = 0o644;
const CREDENTIAL_MODE: u32 = 0o600;
const ROOT_CA_MODE: u32 = 0o644;

/// Settings the composition root hands to [`Bootstrap`].
#[derive(Debug, Clone)]
pub struct BootstrapSettings {
    /// Directory holding `bootstrap/files` and `bootstrap/systemd/units`.
    pub data_dir: PathBuf,
    /// Configured release image. The environment override still wins.
    pub release_image: Option<String>,
}

impl Default for BootstrapSettings {
    fn default() -> Self {
        BootstrapSettings {
            data_dir: default_data_dir(),
            release_image: None,
        }
    }
}

impl BootstrapSettings {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        BootstrapSettings {
            data_dir: data_dir.into(),
            release_image: None,
        }
    }

    pub fn with_release_image(mut self, image: Option<String>) -> Self {
        self.release_image = image;
        self
    }

    /// Release image to render into templates.
    ///
    /// A non-empty [`RELEASE_IMAGE_OVERRIDE_ENV`] beats the configured image,
    /// which beats [`DEFAULT_RELEASE_IMAGE`].
    pub fn release_image(&self) -> String {
        match env::var(RELEASE_IMAGE_OVERRIDE_ENV) {
            Ok(image) if !image.is_empty() => {
                warn!("Found override for ReleaseImage. Please be warned, this is not advised");
                image
            }
            _ => self
                .release_image
                .clone()
                .unwrap_or_else(|| DEFAULT_RELEASE_IMAGE.to_string()),
        }
    }
}

/// Data directory shipped with the crate.
pub fn default_data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// Values substituted into bootstrap templates.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct TemplateData {
    etcd_cert_signer_image: String,
    etcd_cluster: String,
    pull_secret: String,
    release_image: String,
}

impl TemplateData {
    fn new(install: &InstallConfigSpec, settings: &BootstrapSettings) -> Self {
        TemplateData {
            etcd_cert_signer_image: ETCD_CERT_SIGNER_IMAGE.to_string(),
            etcd_cluster: install.etcd_endpoints().join(","),
            pull_secret: install.pull_secret.clone(),
            release_image: settings.release_image(),
        }
    }
}

/// The bootstrap config asset.
#[derive(Debug)]
pub struct Bootstrap {
    settings: BootstrapSettings,
    config: Option<bundle::Config>,
    files: Vec<File>,
}

impl Bootstrap {
    pub fn new(settings: BootstrapSettings) -> Self {
        Bootstrap {
            settings,
            config: None,
            files: Vec::new(),
        }
    }

    /// The composed bundle, once resolved.
    pub fn config(&self) -> Option<&bundle::Config> {
        self.config.as_ref()
    }

    fn add_parent_files(&self, config: &mut bundle::Config, parents: &Parents<'_>) -> Result<()> {
        for spec in provided::MANIFESTS {
            let asset = parents.get_dyn(spec.id)?;
            config.add_files(files_from_asset(ROOT_DIR, FILE_OWNER, MANIFEST_MODE, asset))?;
        }

        for spec in provided::CREDENTIALS {
            let asset = parents.get_dyn(spec.id)?;
            config.add_files(files_from_asset(ROOT_DIR, FILE_OWNER, CREDENTIAL_MODE, asset))?;
        }

        let root_ca = parents.get_dyn(provided::ROOT_CA.id)?;
        let cert = root_ca
            .files()
            .iter()
            .find(|f| f.filename.ends_with(".crt"))
            .with_context(|| format!("\"{}\" has no certificate", root_ca.name()))?;
        let path = Path::new(ROOT_DIR).join(&cert.filename);
        config.add_file(StorageFile::from_bytes(
            path.to_string_lossy(),
            FILE_OWNER,
            ROOT_CA_MODE,
            &cert.data,
        ))?;

        let journal = parents.get_dyn(provided::JOURNAL.id)?;
        config.add_files(files_from_asset(ROOT_DIR, JOURNAL_OWNER, CREDENTIAL_MODE, journal))?;

        Ok(())
    }
}

impl TypedAsset for Bootstrap {
    const ID: AssetId = super::BOOTSTRAP;
}

impl Asset for Bootstrap {
    fn id(&self) -> AssetId {
        Self::ID
    }

    fn name(&self) -> &str {
        "Bootstrap Ignition Config"
    }

    fn dependencies(&self) -> Vec<AssetId> {
        let mut deps = vec![InstallConfig::ID];
        deps.extend(provided::all().map(|spec: &ProvidedSpec| spec.id));
        deps
    }

    fn generate(&mut self, parents: &Parents<'_>) -> Result<()> {
        let install = parents
            .get::<InstallConfig>()?
            .config()
            .context("install config is empty")?;

        let data = TemplateData::new(install, &self.settings);
        let context = TemplateContext::from_serialize(&data)
            .context("failed to build bootstrap template data")?;

        let data_dir = DataDir::new(&self.settings.data_dir);
        debug!("Rendering bootstrap templates from {}", data_dir.root().display());

        let mut config = bundle::Config::new();
        config.add_files(data_dir.storage_files("/", FILES_URI, &context)?)?;
        for unit in data_dir.systemd_units(UNITS_URI, &context, ENABLED_UNITS)? {
            config.add_unit(unit)?;
        }
        self.add_parent_files(&mut config, parents)?;

        config.add_user(PasswdUser {
            name: LOGIN_USER.to_string(),
            ssh_authorized_keys: vec![install.ssh_key.clone()],
        });

        let data = config.to_bytes()?;
        self.files = vec![File::new(BOOTSTRAP_IGN_FILENAME, data)];
        self.config = Some(config);
        Ok(())
    }

    fn files(&self) -> &[File] {
        &self.files
    }

    fn load(&mut self, fetcher: &dyn FileFetcher) -> Result<bool> {
        let Some(file) = fetcher.fetch_optional(BOOTSTRAP_IGN_FILENAME)? else {
            return Ok(false);
        };

        let config = bundle::Config::from_bytes(&file.data)
            .with_context(|| format!("failed to load {}", BOOTSTRAP_IGN_FILENAME))?;

        self.config = Some(config);
        self.files = vec![file];
        Ok(true)
    }
}
