//! CLI initialization: the root parser configuration
//!
//! The blueprint is an immutable value; each call to [`CliBlueprint::command`]
//! materializes a fresh clap `Command` from it.

use std::path::Path;

use tracing::{debug, instrument};

use crate::application::services::ManifestService;
use crate::application::ApplicationResult;
use crate::domain::{DomainError, Inventory, PackageManifest};

/// Root parser configuration derived from the inventory and package metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliBlueprint {
    pub name: String,
    pub version: String,
    /// `<name> <command> [options]`
    pub usage: String,
    /// Shown after the help text
    pub epilog: String,
    pub about: Option<String>,
}

impl CliBlueprint {
    pub fn new(name: &str, manifest: &PackageManifest) -> Self {
        let mut epilog = format!("{} v{}", name, manifest.version);
        if let Some(homepage) = &manifest.homepage {
            epilog.push('\n');
            epilog.push_str(homepage);
        }
        Self {
            name: name.to_string(),
            version: manifest.version.clone(),
            usage: format!("{} <command> [options]", name),
            epilog,
            about: manifest.description.clone(),
        }
    }

    /// Root clap command: usage banner, help and version flags, epilog,
    /// help rendered without re-wrapping.
    pub fn command(&self) -> clap::Command {
        let command = clap::Command::new(self.name.clone())
            .version(self.version.clone())
            .override_usage(self.usage.clone())
            .after_help(self.epilog.clone())
            .term_width(0)
            .disable_help_subcommand(true);
        match &self.about {
            Some(about) => command.about(about.clone()),
            None => command,
        }
    }
}

/// Build the root parser configuration.
///
/// Fails with `UnboundCommandName` unless the package declares the inventory
/// name as one of its executables.
#[instrument(skip_all, fields(name = %inventory.name))]
pub fn initialize_cli(
    inventory: &Inventory,
    working_dir: &Path,
    manifests: &ManifestService,
) -> ApplicationResult<CliBlueprint> {
    let manifest = manifests.load(working_dir)?;
    if !manifest.declares_bin(&inventory.name) {
        return Err(DomainError::UnboundCommandName {
            name: inventory.name.clone(),
            declared: if manifest.bins.is_empty() {
                "none".to_string()
            } else {
                manifest.bins.join(", ")
            },
        }
        .into());
    }

    let blueprint = CliBlueprint::new(&inventory.name, &manifest);
    debug!("initialize_cli: version={}", blueprint.version);
    Ok(blueprint)
}
