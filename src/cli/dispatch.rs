//! Command dispatch
//!
//! Resolves every inventory command, registers them on the root parser,
//! parses the invocation and hands control to the matched executor.

use std::ffi::OsString;
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use clap::error::ErrorKind;
use tracing::{debug, info, instrument, warn};

use crate::application::services::{CommandResolver, ResolvedCommand};
use crate::application::{ApplicationError, ExecutorResult};
use crate::cli::blueprint::CliBlueprint;
use crate::cli::{CliError, CliResult};
use crate::domain::{DomainError, Inventory};
use crate::infrastructure::traits::FileSystem;

/// Outcome of a dispatch that did not fail inside this layer.
#[derive(Debug)]
pub enum Dispatch {
    /// The executor ran; its result is passed through untouched.
    Executed(ExecutorResult),
    /// Help or version text was requested and written.
    Displayed,
    /// No command token; help text was written.
    MissingCommand,
}

/// Registers resolved commands and routes one invocation.
pub struct Dispatcher<'a> {
    blueprint: &'a CliBlueprint,
    resolver: &'a CommandResolver,
    fs: Arc<dyn FileSystem>,
}

impl<'a> Dispatcher<'a> {
    pub fn new(blueprint: &'a CliBlueprint, resolver: &'a CommandResolver, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            blueprint,
            resolver,
            fs,
        }
    }

    /// Resolve all commands into the dispatch table, in inventory order.
    ///
    /// Every command is resolved, invoked or not. A repeated name replaces
    /// the earlier entry.
    pub fn dispatch_table(&self, inventory: &Inventory) -> CliResult<Vec<ResolvedCommand>> {
        if let Some(index) = inventory
            .commands
            .iter()
            .position(|c| c.name.as_deref().map_or(true, |n| n.trim().is_empty()))
        {
            warn!("dispatch_table: command at position {} has no name", index);
            return Err(DomainError::MissingCommandName.into());
        }

        let mut table: Vec<ResolvedCommand> = Vec::with_capacity(inventory.commands.len());
        for spec in &inventory.commands {
            let resolved = self.resolver.parse_command(spec)?;
            match table.iter_mut().find(|c| c.name == resolved.name) {
                Some(existing) => {
                    warn!("dispatch_table: command `{}` declared twice, last wins", resolved.name);
                    *existing = resolved;
                }
                None => table.push(resolved),
            }
        }
        Ok(table)
    }

    /// Parse `args` (including the program name) and run the matched executor.
    ///
    /// Help text goes to `out`. Executor failures are returned in
    /// `Dispatch::Executed`, never converted into a `CliError`.
    #[instrument(skip_all, fields(tool = %inventory.name))]
    pub fn execute_command<I, T>(
        &self,
        inventory: &Inventory,
        working_dir: &Path,
        args: I,
        out: &mut dyn Write,
    ) -> CliResult<Dispatch>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        if !self.fs.is_dir(working_dir) {
            return Err(ApplicationError::InvalidDirectory(working_dir.to_path_buf()).into());
        }

        let table = self.dispatch_table(inventory)?;
        debug!("execute_command: {} commands registered", table.len());

        let mut root = self
            .blueprint
            .command()
            .allow_external_subcommands(true)
            .subcommands(table.iter().map(ResolvedCommand::subcommand));

        let args = retain_declared_args(&table, args.into_iter().map(Into::into).collect());
        let matches = match root.try_get_matches_from_mut(args) {
            Ok(matches) => matches,
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                emit(out, &e)?;
                return Ok(Dispatch::Displayed);
            }
            Err(e) => return Err(e.into()),
        };

        let Some((name, sub_matches)) = matches.subcommand() else {
            emit(out, &root.render_help())?;
            return Ok(Dispatch::MissingCommand);
        };

        let Some(command) = table.iter().find(|c| c.name == name) else {
            emit(out, &root.render_help())?;
            return Err(CliError::UnknownCommand(name.to_string()));
        };

        let invocation = command.invocation(sub_matches);
        info!("execute_command: {} {:?}", invocation.name, invocation.options);
        Ok(Dispatch::Executed(command.executor().execute(&invocation)))
    }
}

fn emit(out: &mut dyn Write, text: &impl fmt::Display) -> CliResult<()> {
    write!(out, "{}", text).map_err(|e| ApplicationError::OperationFailed {
        context: "write help text".to_string(),
        source: Box::new(e),
    })?;
    Ok(())
}

/// Flags the root command itself accepts.
const ROOT_FLAGS: [&str; 4] = ["-h", "--help", "-V", "--version"];

/// Strip undeclared flags so the parser accepts the rest.
///
/// Before the command token only help and version flags survive; an unknown
/// root flag never consumes a value. After it, the command's own filter applies.
fn retain_declared_args(table: &[ResolvedCommand], args: Vec<OsString>) -> Vec<OsString> {
    let mut iter = args.into_iter();
    let mut kept: Vec<OsString> = iter.next().into_iter().collect();

    while let Some(arg) = iter.next() {
        let token = arg.to_str().unwrap_or_default();
        if token.starts_with('-') && token != "-" && token != "--" {
            if ROOT_FLAGS.contains(&token) {
                kept.push(arg);
            } else {
                debug!("retain_declared_args: ignoring root flag {}", token);
            }
            continue;
        }

        let command = table.iter().find(|c| c.name == token);
        kept.push(arg);
        let rest: Vec<OsString> = iter.by_ref().collect();
        match command {
            Some(command) => kept.extend(command.retain_declared(&rest)),
            None => kept.extend(rest),
        }
        break;
    }
    kept
}
