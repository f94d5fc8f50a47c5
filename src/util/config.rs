//! Configuration file support for Ignis.
//!
//! Ignis supports two configuration file locations:
//! - Global: `~/.ignis/config.toml` - User-wide defaults
//! - Project: `.ignis/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. Command-line flags
//! take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Ignis configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bootstrap config settings
    pub bootstrap: BootstrapConfig,

    /// Asset directory settings
    pub assets: AssetsConfig,
}

/// Settings for the bootstrap config asset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Release image rendered into bootstrap templates
    pub release_image: Option<String>,

    /// Directory holding the bootstrap data (files and systemd units)
    pub data_dir: Option<PathBuf>,
}

/// Settings for the asset directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Default asset directory (defaults to the current directory)
    pub dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.bootstrap.release_image.is_some() {
            self.bootstrap.release_image = other.bootstrap.release_image;
        }
        if other.bootstrap.data_dir.is_some() {
            self.bootstrap.data_dir = other.bootstrap.data_dir;
        }
        if other.assets.dir.is_some() {
            self.assets.dir = other.assets.dir;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.ignis/config.toml)
/// 2. Global config (~/.ignis/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global ignis config directory (~/.ignis).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".ignis"))
}

/// Get the project config path (.ignis/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".ignis").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.bootstrap.release_image.is_none());
        assert!(config.bootstrap.data_dir.is_none());
        assert!(config.assets.dir.is_none());
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
[bootstrap]
release_image = "quay.io/example/release:4.1"
data_dir = "/usr/share/ignis"

[assets]
dir = "./cluster"
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(
            config.bootstrap.release_image.as_deref(),
            Some("quay.io/example/release:4.1")
        );
        assert_eq!(config.bootstrap.data_dir, Some(PathBuf::from("/usr/share/ignis")));
        assert_eq!(config.assets.dir, Some(PathBuf::from("./cluster")));
    }

    #[test]
    fn test_invalid_config_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(&config_path, "[bootstrap\nrelease_image = 1").unwrap();

        assert!(Config::load(&config_path).is_err());
        assert_eq!(Config::load_or_default(&config_path), Config::default());
    }

    #[test]
    fn test_load_config_precedence() {
        let tmp = TempDir::new().unwrap();
        let global_path = tmp.path().join("global.toml");
        let project_path = tmp.path().join("project.toml");

        std::fs::write(
            &global_path,
            r#"
[bootstrap]
release_image = "global/image:1"
data_dir = "/global/data"
"#,
        )
        .unwrap();

        std::fs::write(
            &project_path,
            r#"
[bootstrap]
release_image = "project/image:2"
"#,
        )
        .unwrap();

        let config = load_config(&global_path, &project_path);

        // Project config should override release_image
        assert_eq!(config.bootstrap.release_image.as_deref(), Some("project/image:2"));
        // Global data_dir should be preserved
        assert_eq!(config.bootstrap.data_dir, Some(PathBuf::from("/global/data")));
    }

    #[test]
    fn test_load_config_missing_files() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("a.toml"), &tmp.path().join("b.toml"));
        assert_eq!(config, Config::default());
    }
}
