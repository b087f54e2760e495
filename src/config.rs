//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/cliventory/cliventory.toml`
//! 3. Local config: `<working_dir>/.cliventory.toml`
//! 4. Environment variables: `CLIVENTORY_*` prefix (lists comma-separated)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Unified configuration for cliventory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Inventory file names tried in the working directory, first match wins
    pub inventory_files: Vec<String>,
    /// Package manifest file names tried in the working directory, first match wins
    pub package_manifests: Vec<String>,
    /// Resolve unregistered executors as executable files under the working directory
    pub external_executors: bool,
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            inventory_files: vec!["cliventory.yml".into(), "cliventory.yaml".into()],
            package_manifests: vec!["package.json".into(), "Cargo.toml".into()],
            external_executors: true,
            log_level: "warn".into(),
        }
    }
}

/// Get the XDG config directory for cliventory.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "cliventory").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("cliventory.toml"))
}

/// Get the path to the local config file in a working directory.
pub fn local_config_path(working_dir: &Path) -> PathBuf {
    working_dir.join(".cliventory.toml")
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `working_dir` - Optional working directory holding a local `.cliventory.toml`
    ///
    /// Missing files are skipped; malformed ones fail with `ApplicationError::Config`.
    pub fn load(working_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("inventory_files", defaults.inventory_files.clone())
            .map_err(config_err)?
            .set_default("package_manifests", defaults.package_manifests.clone())
            .map_err(config_err)?
            .set_default("external_executors", defaults.external_executors)
            .map_err(config_err)?
            .set_default("log_level", defaults.log_level.clone())
            .map_err(config_err)?;

        if let Some(global_path) = global_config_path() {
            builder = builder.add_source(
                File::from(global_path)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        if let Some(dir) = working_dir {
            builder = builder.add_source(
                File::from(local_config_path(dir))
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix("CLIVENTORY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("inventory_files")
                .with_list_parse_key("package_manifests"),
        );

        let config = builder.build().map_err(config_err)?;
        config.try_deserialize().map_err(config_err)
    }
}

/// Convert config crate errors to ApplicationError.
fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
