//! Configuration loading for kiln
pub mod constants;

use crate::livereload::LiveReloadSettings;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("unknown compiler '{name}' in config")]
    UnknownCompiler { name: String },
}

/// Top-level configuration: kiln.json with an optional kiln.local.json overlay
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fallback build name for progress logs
    pub name: String,
    pub builds: Vec<BuildConfig>,
    pub roots: RootsConfig,
    pub live_reload: LiveReloadConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: "assets".to_string(),
            builds: Vec::new(),
            roots: RootsConfig::default(),
            live_reload: LiveReloadConfig::default(),
        }
    }
}

impl Config {
    /// Load a configuration file, overlaying the local file next to it when
    /// one exists
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let base = read_value(path)?;

        let local_path = local_config_path(path);
        let merged = if local_path.exists() {
            overlay(base, read_value(&local_path)?)
        } else {
            base
        };

        serde_json::from_value(merged).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// One named build: its bundles, watch patterns and live-reload channel
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub name: Option<String>,
    pub bundles: Vec<BundleConfig>,
    pub watch: Vec<String>,
    pub live_reload: Option<String>,
}

/// One bundle entry of a build
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
    pub src: String,
    pub bundle_root: PathBuf,
    pub import_root: PathBuf,
    pub output_root: PathBuf,
    pub ext: String,
    /// Name of a registered compiler
    pub compiler: String,
    pub read: bool,
    pub write: bool,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            src: String::new(),
            bundle_root: PathBuf::new(),
            import_root: PathBuf::new(),
            output_root: PathBuf::new(),
            ext: String::new(),
            compiler: "copy".to_string(),
            read: true,
            write: true,
        }
    }
}

/// Root directories used to resolve named units
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RootsConfig {
    pub pages: PathBuf,
    pub layouts: PathBuf,
    pub custom_pages: PathBuf,
    pub custom_layouts: PathBuf,
}

impl Default for RootsConfig {
    fn default() -> Self {
        Self {
            pages: PathBuf::from(constants::PAGES_ROOT),
            layouts: PathBuf::from(constants::LAYOUTS_ROOT),
            custom_pages: PathBuf::from(constants::CUSTOM_PAGES_ROOT),
            custom_layouts: PathBuf::from(constants::CUSTOM_LAYOUTS_ROOT),
        }
    }
}

impl RootsConfig {
    /// Every root category, in the order units are resolved against them
    pub fn all(&self) -> Vec<PathBuf> {
        vec![
            self.pages.clone(),
            self.layouts.clone(),
            self.custom_pages.clone(),
            self.custom_layouts.clone(),
        ]
    }
}

/// Live-reload server settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LiveReloadConfig {
    pub host: String,
    pub port: u16,
}

impl Default for LiveReloadConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: constants::DEFAULT_LIVE_RELOAD_PORT,
        }
    }
}

impl LiveReloadConfig {
    pub fn settings(&self) -> LiveReloadSettings {
        LiveReloadSettings {
            host: self.host.clone(),
            port: self.port,
        }
    }
}

fn read_value(path: &Path) -> Result<Value, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Shallow merge: top-level keys of the local file replace those of the base
fn overlay(base: Value, local: Value) -> Value {
    match (base, local) {
        (Value::Object(mut base), Value::Object(local)) => {
            for (key, value) in local {
                base.insert(key, value);
            }
            Value::Object(base)
        }
        (_, local) => local,
    }
}

fn local_config_path(path: &Path) -> PathBuf {
    if path.file_name().is_some_and(|name| name == constants::CONFIG_FILE) {
        return path.with_file_name(constants::LOCAL_CONFIG_FILE);
    }

    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("json");
    path.with_file_name(format!("{stem}.local.{ext}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_apply_to_an_empty_config() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.name, "assets");
        assert!(config.builds.is_empty());
        assert_eq!(config.roots.pages, PathBuf::from("client/ui/pages"));
        assert_eq!(config.live_reload.port, constants::DEFAULT_LIVE_RELOAD_PORT);
    }

    #[test]
    fn bundle_defaults_read_write_copy() {
        let bundle: BundleConfig = serde_json::from_str(r#"{"src": "pages/**/*.x"}"#).unwrap();
        assert!(bundle.read);
        assert!(bundle.write);
        assert_eq!(bundle.compiler, "copy");
    }

    #[test]
    fn load_without_local_file_uses_the_base() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("kiln.json");
        fs::write(&path, r#"{"name": "site"}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.name, "site");
    }

    #[test]
    fn local_file_replaces_top_level_keys() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("kiln.json");
        fs::write(
            &path,
            r#"{"name": "site", "live_reload": {"host": "0.0.0.0", "port": 4000}}"#,
        )
        .unwrap();
        fs::write(
            temp.path().join("kiln.local.json"),
            r#"{"live_reload": {"port": 4001}}"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        // untouched top-level keys survive
        assert_eq!(config.name, "site");
        // replaced keys are taken whole, so the nested host resets
        assert_eq!(config.live_reload.port, 4001);
        assert_eq!(config.live_reload.host, "127.0.0.1");
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(Config::load(&temp.path().join("kiln.json")).is_err());
    }

    #[test]
    fn invalid_json_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("kiln.json");
        fs::write(&path, "{").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn local_path_follows_the_config_name() {
        assert_eq!(
            local_config_path(Path::new("kiln.json")),
            PathBuf::from("kiln.local.json")
        );
        assert_eq!(
            local_config_path(Path::new("conf/site.json")),
            PathBuf::from("conf/site.local.json")
        );
    }
}
