//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, CommandRunner)
//! but are themselves concrete structs, not traits.

use std::path::{Path, PathBuf};

use crate::infrastructure::traits::FileSystem;

mod inventory;
mod manifest;
mod resolver;

pub use inventory::{parse_inventory, InventoryService};
pub use manifest::{parse_cargo_manifest, parse_package_json, ManifestService};
pub use resolver::{CommandResolver, ResolvedCommand, ResolvedOption};

/// First of `names` that exists as a file in `dir`.
fn find_first(fs: &dyn FileSystem, dir: &Path, names: &[String]) -> Option<PathBuf> {
    names
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| fs.is_file(candidate))
}
