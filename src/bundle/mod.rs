//! Combined bootstrap config.
//!
//! The bundle is the single document a machine consumes on first boot:
//! files to write, systemd units to install and users to create. It is
//! serialized as JSON with a fixed field order so that the same logical
//! content always produces the same bytes.
//!
//! Two files may not claim the same path. The only exception is a file
//! flagged `append`, whose contents are added to whatever is already there.

pub mod dataurl;

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::asset::Asset;

/// Config format version written into every bundle.
pub const SPEC_VERSION: &str = "2.2.0";

/// Error building or (de)serializing a bundle.
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("file `{path}` is written by more than one source")]
    PathCollision { path: String },

    #[error("systemd unit `{name}` is defined more than once")]
    DuplicateUnit { name: String },

    #[error("failed to serialize bootstrap config")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to parse bootstrap config")]
    Parse(#[source] serde_json::Error),
}

/// The combined config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub ignition: Ignition,
    #[serde(default)]
    pub passwd: Passwd,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub systemd: Systemd,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ignition {
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passwd {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<PasswdUser>,
}

/// A login user and its authorized SSH keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswdUser {
    pub name: String,
    #[serde(
        rename = "sshAuthorizedKeys",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub ssh_authorized_keys: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Storage {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<StorageFile>,
}

/// A file written to the machine's root filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageFile {
    pub filesystem: String,
    pub path: String,
    pub user: NodeUser,
    #[serde(default, skip_serializing_if = "is_false")]
    pub append: bool,
    pub contents: FileContents,
    /// Permission bits, serialized as a decimal integer.
    pub mode: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeUser {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContents {
    /// `data:` URL holding the file bytes.
    pub source: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Systemd {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub units: Vec<Unit>,
}

/// A systemd unit, either a full definition or a set of drop-ins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dropins: Vec<Dropin>,
}

/// A fragment that augments a unit instead of replacing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dropin {
    pub name: String,
    pub contents: String,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl StorageFile {
    /// A file on the root filesystem holding `data`.
    pub fn from_bytes(path: impl Into<String>, user: &str, mode: u32, data: &[u8]) -> Self {
        StorageFile {
            filesystem: "root".to_string(),
            path: path.into(),
            user: NodeUser {
                name: user.to_string(),
            },
            append: false,
            contents: FileContents {
                source: dataurl::encode(data),
            },
            mode,
        }
    }

    pub fn with_append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    /// Decoded file bytes.
    pub fn data(&self) -> Result<Vec<u8>, dataurl::DataUrlError> {
        dataurl::decode(&self.contents.source)
    }
}

/// Storage entries for every file of `asset`, placed below `root`.
pub fn files_from_asset(root: &str, user: &str, mode: u32, asset: &dyn Asset) -> Vec<StorageFile> {
    asset
        .files()
        .iter()
        .map(|file| {
            let path = Path::new(root).join(&file.filename);
            StorageFile::from_bytes(path.to_string_lossy(), user, mode, &file.data)
        })
        .collect()
}

impl Unit {
    pub fn with_contents(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Unit {
            name: name.into(),
            enabled: None,
            contents: Some(contents.into()),
            dropins: Vec::new(),
        }
    }

    pub fn with_dropins(name: impl Into<String>, dropins: Vec<Dropin>) -> Self {
        Unit {
            name: name.into(),
            enabled: None,
            contents: None,
            dropins,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Config {
            ignition: Ignition {
                version: SPEC_VERSION.to_string(),
            },
            passwd: Passwd::default(),
            storage: Storage::default(),
            systemd: Systemd::default(),
        }
    }

    /// Add a file, rejecting a second non-append claim on the same path.
    pub fn add_file(&mut self, file: StorageFile) -> Result<(), BundleError> {
        if !file.append && self.storage.files.iter().any(|f| f.path == file.path) {
            return Err(BundleError::PathCollision { path: file.path });
        }
        self.storage.files.push(file);
        Ok(())
    }

    pub fn add_files(&mut self, files: impl IntoIterator<Item = StorageFile>) -> Result<(), BundleError> {
        for file in files {
            self.add_file(file)?;
        }
        Ok(())
    }

    pub fn add_unit(&mut self, unit: Unit) -> Result<(), BundleError> {
        if self.systemd.units.iter().any(|u| u.name == unit.name) {
            return Err(BundleError::DuplicateUnit { name: unit.name });
        }
        self.systemd.units.push(unit);
        Ok(())
    }

    pub fn add_user(&mut self, user: PasswdUser) {
        self.passwd.users.push(user);
    }

    /// Look up a file by its target path (the first entry if appended to).
    pub fn file(&self, path: &str) -> Option<&StorageFile> {
        self.storage.files.iter().find(|f| f.path == path)
    }

    pub fn unit(&self, name: &str) -> Option<&Unit> {
        self.systemd.units.iter().find(|u| u.name == name)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, BundleError> {
        serde_json::to_vec(self).map_err(BundleError::Serialize)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, BundleError> {
        serde_json::from_slice(data).map_err(BundleError::Parse)
    }
}
