//! Reading and writing asset files in the asset directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::asset::{Asset, File};
use crate::util::fs::{ensure_dir, relative_path};

/// Error fetching a persisted file.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid file pattern `{pattern}`")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound { .. })
    }
}

/// Source of previously persisted asset files.
pub trait FileFetcher {
    /// Fetch a single file by its name relative to the asset directory.
    fn fetch_by_name(&self, name: &str) -> Result<File, FetchError>;

    /// Fetch every file matching a glob pattern, sorted by name.
    fn fetch_by_pattern(&self, pattern: &str) -> Result<Vec<File>, FetchError>;

    /// Like [`fetch_by_name`](Self::fetch_by_name), but a missing file is `None`.
    fn fetch_optional(&self, name: &str) -> Result<Option<File>, FetchError> {
        match self.fetch_by_name(name) {
            Ok(file) => Ok(Some(file)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Fetches files from a directory on disk.
#[derive(Debug, Clone)]
pub struct DiskFetcher {
    dir: PathBuf,
}

impl DiskFetcher {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DiskFetcher { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read(&self, path: &Path) -> Result<File, FetchError> {
        let data = fs::read(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                FetchError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                FetchError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        Ok(File {
            filename: asset_filename(&relative_path(&self.dir, path)),
            data,
        })
    }
}

impl FileFetcher for DiskFetcher {
    fn fetch_by_name(&self, name: &str) -> Result<File, FetchError> {
        self.read(&self.dir.join(name))
    }

    fn fetch_by_pattern(&self, pattern: &str) -> Result<Vec<File>, FetchError> {
        // Only `pattern` may carry wildcards; the directory is matched literally.
        let full = Path::new(&glob::Pattern::escape(&self.dir.to_string_lossy())).join(pattern);
        let paths = glob::glob(&full.to_string_lossy()).map_err(|source| FetchError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;

        let mut files = Vec::new();
        for entry in paths {
            let path = entry.map_err(|e| FetchError::Io {
                path: e.path().to_path_buf(),
                source: e.into_error(),
            })?;
            if path.is_file() {
                files.push(self.read(&path)?);
            }
        }

        files.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(files)
    }
}

/// Write every file of `asset` below `dir`.
pub fn persist_to_dir(asset: &dyn Asset, dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for file in asset.files() {
        let path = dir.join(&file.filename);
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        fs::write(&path, &file.data).with_context(|| {
            format!(
                "failed to write {} for asset \"{}\"",
                path.display(),
                asset.name()
            )
        })?;
        written.push(path);
    }

    Ok(written)
}

fn asset_filename(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
