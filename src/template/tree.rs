//! Rendering directory trees of bootstrap data.
//!
//! Layout below the data directory:
//!
//! ```text
//! bootstrap/files/<absolute target path>     files for the root filesystem
//! bootstrap/systemd/units/<unit>             whole unit definitions
//! bootstrap/systemd/units/<unit>.d/<dropin>  drop-ins for <unit>
//! ```
//!
//! Entries are visited in file name order so the output is deterministic.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::bundle::{Dropin, StorageFile, Unit};
use crate::template::{render, TemplateContext};
use crate::util::fs::relative_path;

/// Suffix of a directory holding drop-ins for one unit.
pub const DROPIN_DIR_SUFFIX: &str = ".d";

/// Owner of every file rendered from the data directory.
const FILE_OWNER: &str = "root";

/// Permission and merge policy for a file under the files tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMeta {
    pub mode: u32,
    pub append: bool,
}

/// Policy for the file at `uri`: executables under a `bin` directory,
/// `motd` is appended to, everything else is private.
pub fn file_meta(uri: &Path) -> FileMeta {
    let parent = uri.parent().and_then(|p| p.file_name());
    let name = uri.file_name();

    if parent.is_some_and(|p| p == "bin") {
        FileMeta {
            mode: 0o555,
            append: false,
        }
    } else if name.is_some_and(|n| n == "motd") {
        FileMeta {
            mode: 0o644,
            append: true,
        }
    } else {
        FileMeta {
            mode: 0o600,
            append: false,
        }
    }
}

/// A directory of bootstrap data (files and systemd units).
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DataDir { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Render every file below `uri`, targeting the same relative path
    /// below `base` with the template suffix removed.
    pub fn storage_files(
        &self,
        base: &str,
        uri: &str,
        context: &TemplateContext,
    ) -> Result<Vec<StorageFile>> {
        let dir = self.root.join(uri);
        let mut files = Vec::new();

        for entry in WalkDir::new(&dir).sort_by_file_name() {
            let entry = entry.with_context(|| format!("failed to walk {}", dir.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let source = entry.path();
            let rel = relative_path(&dir, source);
            let name = entry.file_name().to_string_lossy().into_owned();
            let data = fs::read(source)
                .with_context(|| format!("failed to read {}", source.display()))?;
            let (_, data) = render(&name, data, context)
                .with_context(|| format!("failed to render {}", source.display()))?;

            let target = Path::new(base).join(&rel);
            let target = target.to_string_lossy();
            let target = target
                .strip_suffix(super::TEMPLATE_SUFFIX)
                .unwrap_or(&target);

            let meta = file_meta(&rel);
            files.push(
                StorageFile::from_bytes(target, FILE_OWNER, meta.mode, &data)
                    .with_append(meta.append),
            );
        }

        Ok(files)
    }

    /// Render the systemd units below `uri`.
    ///
    /// Units named in `enabled` are marked enabled; others are left unset.
    /// Directories not ending in [`DROPIN_DIR_SUFFIX`] are skipped.
    pub fn systemd_units(
        &self,
        uri: &str,
        context: &TemplateContext,
        enabled: &[&str],
    ) -> Result<Vec<Unit>> {
        let dir = self.root.join(uri);
        let mut units = Vec::new();

        for entry in children(&dir)? {
            let path = entry.path();
            let child_name = entry.file_name().to_string_lossy().into_owned();

            let mut unit = if entry.file_type().is_dir() {
                let Some(unit_name) = child_name.strip_suffix(DROPIN_DIR_SUFFIX) else {
                    tracing::trace!(
                        "Ignoring internal asset directory {:?} while looking for systemd drop-ins",
                        child_name
                    );
                    continue;
                };

                let mut dropins = Vec::new();
                for dropin in children(path)? {
                    let (name, contents) = render_text(dropin.path(), context)?;
                    dropins.push(Dropin { name, contents });
                }
                Unit::with_dropins(unit_name, dropins)
            } else {
                let (name, contents) = render_text(path, context)?;
                Unit::with_contents(name, contents)
            };

            if enabled.contains(&unit.name.as_str()) {
                unit.enabled = Some(true);
            }
            units.push(unit);
        }

        Ok(units)
    }
}

/// Direct children of `dir`, sorted by file name.
fn children(dir: &Path) -> Result<Vec<walkdir::DirEntry>> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("failed to read directory {}", dir.display()))
}

/// Read and render a unit or drop-in file into its final name and text.
fn render_text(path: &Path, context: &TemplateContext) -> Result<(String, String)> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let data = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let (name, data) =
        render(&name, data, context).with_context(|| format!("failed to render {}", path.display()))?;
    let text = String::from_utf8(data)
        .with_context(|| format!("systemd unit {} is not valid UTF-8", path.display()))?;
    Ok((name, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::TemplateError;
    use serde_json::json;
    use tempfile::TempDir;

    fn context() -> TemplateContext {
        TemplateContext::from_serialize(&json!({
            "ReleaseImage": "quay.io/example/release:1",
            "EtcdCluster": "https://etcd-0.example.com:2379",
        }))
        .unwrap()
    }

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_file_meta_policy() {
        assert_eq!(
            file_meta(Path::new("usr/local/bin/foo")),
            FileMeta { mode: 0o555, append: false }
        );
        assert_eq!(
            file_meta(Path::new("etc/motd")),
            FileMeta { mode: 0o644, append: true }
        );
        assert_eq!(
            file_meta(Path::new("etc/kubernetes/kubelet.conf")),
            FileMeta { mode: 0o600, append: false }
        );
    }

    #[test]
    fn test_storage_files() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "bootstrap/files/etc/motd", "welcome\n");
        write(
            tmp.path(),
            "bootstrap/files/usr/local/bin/start.sh.template",
            "run {{.ReleaseImage}}\n",
        );
        write(tmp.path(), "bootstrap/files/etc/etcd.env.template", "ETCD={{.EtcdCluster}}");

        let data = DataDir::new(tmp.path());
        let files = data.storage_files("/", "bootstrap/files", &context()).unwrap();

        let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["/etc/etcd.env", "/etc/motd", "/usr/local/bin/start.sh"]);

        assert_eq!(files[0].mode, 0o600);
        assert_eq!(files[0].data().unwrap(), b"ETCD=https://etcd-0.example.com:2379");

        assert_eq!(files[1].mode, 0o644);
        assert!(files[1].append);

        assert_eq!(files[2].mode, 0o555);
        assert!(!files[2].append);
        assert_eq!(files[2].data().unwrap(), b"run quay.io/example/release:1\n");
    }

    #[test]
    fn test_storage_file_template_error_propagates() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "bootstrap/files/etc/bad.template", "{{.Nope}}");

        let err = DataDir::new(tmp.path())
            .storage_files("/", "bootstrap/files", &context())
            .unwrap_err();
        assert!(err.downcast_ref::<TemplateError>().is_some());
    }

    #[test]
    fn test_systemd_units() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "units/kubelet.service.template", "ExecStart=run {{.ReleaseImage}}\n");
        write(tmp.path(), "units/bootkube.service", "[Unit]\n");
        write(tmp.path(), "units/crio.service.d/10-env.conf", "[Service]\n");
        write(tmp.path(), "units/crio.service.d/20-image.conf.template", "Image={{.ReleaseImage}}\n");
        write(tmp.path(), "units/internal/ignored.service", "[Unit]\n");

        let data = DataDir::new(tmp.path());
        let units = data
            .systemd_units("units", &context(), &["kubelet.service", "crio.service"])
            .unwrap();

        let names: Vec<_> = units.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["bootkube.service", "crio.service", "kubelet.service"]);

        assert_eq!(units[0].enabled, None);
        assert_eq!(units[0].contents.as_deref(), Some("[Unit]\n"));

        assert_eq!(units[1].enabled, Some(true));
        assert!(units[1].contents.is_none());
        assert_eq!(units[1].dropins.len(), 2);
        assert_eq!(units[1].dropins[1].name, "20-image.conf");
        assert_eq!(units[1].dropins[1].contents, "Image=quay.io/example/release:1\n");

        assert_eq!(units[2].enabled, Some(true));
        assert_eq!(
            units[2].contents.as_deref(),
            Some("ExecStart=run quay.io/example/release:1\n")
        );
    }

    #[test]
    fn test_missing_units_dir_is_error() {
        let tmp = TempDir::new().unwrap();
        let data = DataDir::new(tmp.path());
        assert!(data.systemd_units("units", &context(), &[]).is_err());
    }
}
