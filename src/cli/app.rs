//! Top-level boundary: wires services together and owns the exit decision

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::Path;
use std::process;
use std::sync::Arc;

use tracing::debug;

use crate::application::services::{CommandResolver, InventoryService, ManifestService};
use crate::application::{ApplicationError, ExecutorRegistry};
use crate::cli::blueprint::initialize_cli;
use crate::cli::dispatch::{Dispatch, Dispatcher};
use crate::cli::output::stop_with_error;
use crate::cli::CliResult;
use crate::config::Settings;
use crate::exitcode;
use crate::infrastructure::traits::{CommandRunner, FileSystem, RealCommandRunner, RealFileSystem};
use crate::util::logging::setup_logging;

/// A CLI generated from the inventory in the working directory.
///
/// ```ignore
/// use cliventory::{App, ExecutorRegistry};
///
/// fn main() {
///     let registry = ExecutorRegistry::new()
///         .register_fn("commands/deploy", |inv| {
///             println!("deploying to {}", inv.get_str("env").unwrap_or("staging"));
///             Ok(0)
///         });
///     App::new(registry).run()
/// }
/// ```
pub struct App {
    registry: ExecutorRegistry,
    fs: Arc<dyn FileSystem>,
    runner: Arc<dyn CommandRunner>,
}

impl App {
    /// Create an app with real filesystem and process implementations.
    pub fn new(registry: ExecutorRegistry) -> Self {
        Self::with_deps(registry, Arc::new(RealFileSystem), Arc::new(RealCommandRunner))
    }

    /// Create an app with custom dependencies (for testing).
    pub fn with_deps(
        registry: ExecutorRegistry,
        fs: Arc<dyn FileSystem>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self { registry, fs, runner }
    }

    /// Run against the current directory and process arguments, then exit.
    pub fn run(&self) -> ! {
        let working_dir = std::env::current_dir().unwrap_or_else(|e| {
            stop_with_error(
                &ApplicationError::OperationFailed {
                    context: "determine working directory".to_string(),
                    source: Box::new(e),
                }
                .into(),
            )
        });
        let settings = Settings::load(Some(&working_dir)).unwrap_or_else(|e| stop_with_error(&e.into()));
        setup_logging(&settings.log_level);

        let outcome = self.run_with(&settings, &working_dir, std::env::args_os(), &mut io::stdout());
        match outcome {
            Ok(Dispatch::Executed(Ok(code))) => process::exit(code),
            // Same report a `main` returning `Err` produces.
            Ok(Dispatch::Executed(Err(e))) => {
                eprintln!("Error: {:?}", e);
                process::exit(exitcode::FAILURE)
            }
            Ok(Dispatch::Displayed) => process::exit(exitcode::OK),
            Ok(Dispatch::MissingCommand) => process::exit(exitcode::FAILURE),
            Err(e) => stop_with_error(&e),
        }
    }

    /// Load inventory and package metadata from `working_dir`, then dispatch `args`.
    ///
    /// `args` includes the program name. Help text is written to `out`.
    pub fn run_with<I, T>(
        &self,
        settings: &Settings,
        working_dir: &Path,
        args: I,
        out: &mut dyn Write,
    ) -> CliResult<Dispatch>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        debug!("run_with: working_dir={}", working_dir.display());
        let inventory = InventoryService::new(Arc::clone(&self.fs), settings).load(working_dir)?;
        let manifests = ManifestService::new(Arc::clone(&self.fs), settings);
        let blueprint = initialize_cli(&inventory, working_dir, &manifests)?;

        let resolver = CommandResolver::new(
            working_dir,
            self.registry.clone(),
            Arc::clone(&self.fs),
            Arc::clone(&self.runner),
            settings,
        );
        Dispatcher::new(&blueprint, &resolver, Arc::clone(&self.fs)).execute_command(
            &inventory,
            working_dir,
            args,
            out,
        )
    }
}
