//! Package manifest loading
//!
//! Reads the host package metadata (`package.json` or `Cargo.toml`) to learn
//! which executables the package declares and its version.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::PackageManifest;
use crate::infrastructure::traits::FileSystem;

use super::find_first;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BinField {
    Path(String),
    Map(BTreeMap<String, String>),
}

#[derive(Debug, Deserialize)]
struct RawPackageJson {
    name: Option<String>,
    version: Option<String>,
    bin: Option<BinField>,
    description: Option<String>,
    homepage: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCargoPackage {
    name: String,
    version: Option<toml::Value>,
    description: Option<String>,
    homepage: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCargoBin {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCargoManifest {
    package: Option<RawCargoPackage>,
    #[serde(default)]
    bin: Vec<RawCargoBin>,
}

/// Service for locating and loading the host package manifest.
pub struct ManifestService {
    fs: Arc<dyn FileSystem>,
    file_names: Vec<String>,
}

impl ManifestService {
    /// Create a new manifest service searching for `settings.package_manifests`.
    pub fn new(fs: Arc<dyn FileSystem>, settings: &Settings) -> Self {
        Self {
            fs,
            file_names: settings.package_manifests.clone(),
        }
    }

    /// Load the package manifest found in `working_dir`.
    #[instrument(skip(self))]
    pub fn load(&self, working_dir: &Path) -> ApplicationResult<PackageManifest> {
        if !self.fs.is_dir(working_dir) {
            return Err(ApplicationError::InvalidDirectory(working_dir.to_path_buf()));
        }

        let path = find_first(self.fs.as_ref(), working_dir, &self.file_names).ok_or_else(|| {
            ApplicationError::MissingPackageManifest {
                dir: working_dir.to_path_buf(),
                candidates: self.file_names.join(", "),
            }
        })?;
        debug!("load: package manifest={}", path.display());

        let content = self
            .fs
            .read_to_string(&path)
            .with_path_context("read package manifest", &path)?;

        let manifest = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => parse_cargo_manifest(&content, &path)?,
            _ => parse_package_json(&content, &path)?,
        };
        debug!(
            "load: version={} bins={:?}",
            manifest.version, manifest.bins
        );
        Ok(manifest)
    }
}

fn invalid(path: &Path, message: impl Into<String>) -> ApplicationError {
    ApplicationError::InvalidPackageManifest {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

/// Parse npm-style `package.json` metadata.
pub fn parse_package_json(content: &str, path: &Path) -> ApplicationResult<PackageManifest> {
    let raw: RawPackageJson =
        serde_json::from_str(content).map_err(|e| invalid(path, e.to_string()))?;

    let version = raw
        .version
        .ok_or_else(|| invalid(path, "missing `version` field"))?;

    let bins = match raw.bin {
        Some(BinField::Map(map)) => map.into_keys().collect(),
        Some(BinField::Path(_)) => raw.name.iter().cloned().collect(),
        None => Vec::new(),
    };

    Ok(PackageManifest {
        name: raw.name,
        version,
        bins,
        description: raw.description,
        homepage: raw.homepage,
    })
}

/// Parse a `Cargo.toml` package manifest.
///
/// Without explicit `[[bin]]` targets the package name is the binary name.
pub fn parse_cargo_manifest(content: &str, path: &Path) -> ApplicationResult<PackageManifest> {
    let raw: RawCargoManifest =
        toml::from_str(content).map_err(|e| invalid(path, e.to_string()))?;

    let package = raw
        .package
        .ok_or_else(|| invalid(path, "missing `[package]` table"))?;

    let version = package
        .version
        .as_ref()
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| invalid(path, "`package.version` must be a string"))?;

    let mut bins: Vec<String> = raw.bin.into_iter().filter_map(|b| b.name).collect();
    if bins.is_empty() {
        bins.push(package.name.clone());
    }

    Ok(PackageManifest {
        name: Some(package.name),
        version,
        bins,
        description: package.description,
        homepage: package.homepage,
    })
}
