//! Inventory loading
//!
//! Reads the YAML command inventory from the working directory and validates it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{Inventory, RawInventory};
use crate::infrastructure::traits::FileSystem;

use super::find_first;

/// Service for locating and loading the command inventory.
pub struct InventoryService {
    fs: Arc<dyn FileSystem>,
    file_names: Vec<String>,
}

impl InventoryService {
    /// Create a new inventory service searching for `settings.inventory_files`.
    pub fn new(fs: Arc<dyn FileSystem>, settings: &Settings) -> Self {
        Self {
            fs,
            file_names: settings.inventory_files.clone(),
        }
    }

    /// Load and validate the inventory found in `working_dir`.
    #[instrument(skip(self))]
    pub fn load(&self, working_dir: &Path) -> ApplicationResult<Inventory> {
        if !self.fs.is_dir(working_dir) {
            return Err(ApplicationError::InvalidDirectory(working_dir.to_path_buf()));
        }

        let path = self.locate(working_dir)?;
        debug!("load: inventory={}", path.display());

        let content = self
            .fs
            .read_to_string(&path)
            .with_path_context("read inventory", &path)?;

        let inventory = parse_inventory(&content, &path)?;
        debug!(
            "load: name={} commands={}",
            inventory.name,
            inventory.commands.len()
        );
        Ok(inventory)
    }

    fn locate(&self, working_dir: &Path) -> ApplicationResult<PathBuf> {
        find_first(self.fs.as_ref(), working_dir, &self.file_names).ok_or_else(|| {
            ApplicationError::MissingManifest {
                dir: working_dir.to_path_buf(),
                candidates: self.file_names.join(", "),
            }
        })
    }
}

/// Parse inventory YAML.
///
/// Syntax errors and structurally wrong documents fail with `InvalidManifest`;
/// blank documents and empty mappings fail with `EmptyManifest`.
pub fn parse_inventory(content: &str, path: &Path) -> ApplicationResult<Inventory> {
    let invalid = |e: serde_yaml::Error| ApplicationError::InvalidManifest {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    if content.trim().is_empty() {
        return Err(ApplicationError::EmptyManifest(path.to_path_buf()));
    }

    let document: serde_yaml::Value = serde_yaml::from_str(content).map_err(invalid)?;
    let is_empty = match &document {
        serde_yaml::Value::Null => true,
        serde_yaml::Value::Mapping(m) => m.is_empty(),
        _ => false,
    };
    if is_empty {
        return Err(ApplicationError::EmptyManifest(path.to_path_buf()));
    }

    let raw: RawInventory = serde_yaml::from_value(document).map_err(invalid)?;
    Ok(Inventory::try_from(raw)?)
}
