//! Command resolution
//!
//! Turns an inventory `CommandSpec` into a `ResolvedCommand`: a bound executor,
//! typed options, a help description with flag hints, and the matching clap
//! subcommand definition.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::builder::BoolishValueParser;
use clap::{value_parser, Arg, ArgAction, ArgMatches};
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::executor::{executor_key, Executor, ExecutorRegistry, ExternalExecutor};
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::{CommandSpec, DomainError, Invocation, OptionSpec, OptionType, OptionValue};
use crate::infrastructure::traits::{CommandRunner, FileSystem};

/// Hidden positional that absorbs stray positional tokens.
const EXTRA_ARGS: &str = "cliventory-extra-args";

/// Literals accepted as boolean values, matching clap's `BoolishValueParser`.
const TRUE_LITERALS: [&str; 6] = ["y", "yes", "t", "true", "on", "1"];
const FALSE_LITERALS: [&str; 6] = ["n", "no", "f", "false", "off", "0"];

fn boolish(token: &str) -> Option<bool> {
    let token = token.to_ascii_lowercase();
    if TRUE_LITERALS.contains(&token.as_str()) {
        Some(true)
    } else if FALSE_LITERALS.contains(&token.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// One option of a resolved command.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOption {
    pub name: String,
    pub alias: Option<String>,
    pub default: Option<OptionValue>,
    pub description: Option<String>,
    pub value_type: OptionType,
}

impl ResolvedOption {
    fn from_spec(spec: &OptionSpec) -> Self {
        Self {
            name: spec.name.trim().to_string(),
            alias: spec
                .alias
                .as_deref()
                .map(|a| a.trim().trim_start_matches('-').to_string())
                .filter(|a| !a.is_empty()),
            default: spec.default.clone(),
            description: spec.description.clone(),
            value_type: spec.effective_type(),
        }
    }

    fn short(&self) -> Option<char> {
        let alias = self.alias.as_deref()?;
        let mut chars = alias.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }

    fn long_alias(&self) -> Option<&str> {
        self.alias.as_deref().filter(|_| self.short().is_none())
    }

    fn takes_value(&self) -> bool {
        self.value_type != OptionType::Boolean
    }

    /// Usage hint: `[--name]`, `[--name, -a]` or `[--name, --alias]`.
    pub fn flag_hint(&self) -> String {
        match (self.short(), self.long_alias()) {
            (Some(short), _) => format!("[--{}, -{}]", self.name, short),
            (None, Some(alias)) => format!("[--{}, --{}]", self.name, alias),
            (None, None) => format!("[--{}]", self.name),
        }
    }

    /// clap definition of this option.
    pub fn arg(&self) -> Arg {
        let mut arg = Arg::new(self.name.clone()).long(self.name.clone());
        if let Some(help) = &self.description {
            arg = arg.help(help.clone());
        }
        if let Some(short) = self.short() {
            arg = arg.short(short);
        } else if let Some(alias) = self.long_alias() {
            arg = arg.visible_alias(alias.to_string());
        }

        arg = match self.value_type {
            // `--flag` or `--flag=<bool>`
            OptionType::Boolean => arg
                .action(ArgAction::Set)
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("true")
                .value_parser(BoolishValueParser::new()),
            OptionType::Integer => arg
                .action(ArgAction::Set)
                .allow_negative_numbers(true)
                .value_parser(value_parser!(i64)),
            OptionType::Number => arg
                .action(ArgAction::Set)
                .allow_negative_numbers(true)
                .value_parser(value_parser!(f64)),
            OptionType::String => arg.action(ArgAction::Set).value_parser(value_parser!(String)),
        };

        match (&self.default, self.value_type) {
            (Some(default), _) => arg.default_value(default.to_string()),
            (None, OptionType::Boolean) => arg.default_value("false"),
            (None, _) => arg,
        }
    }

    fn value_of(&self, matches: &ArgMatches) -> Option<OptionValue> {
        let id = self.name.as_str();
        match self.value_type {
            OptionType::Boolean => matches.get_one::<bool>(id).copied().map(OptionValue::Boolean),
            OptionType::Integer => matches.get_one::<i64>(id).copied().map(OptionValue::Integer),
            OptionType::Number => matches.get_one::<f64>(id).copied().map(OptionValue::Number),
            OptionType::String => matches.get_one::<String>(id).cloned().map(OptionValue::String),
        }
    }
}

enum Flag<'a> {
    Declared(&'a ResolvedOption),
    Help,
    Unknown,
}

/// A command ready for registration and dispatch.
#[derive(Clone)]
pub struct ResolvedCommand {
    pub name: String,
    /// Description prefixed with flag hints, in declaration order
    pub description: String,
    /// Options in declaration order
    pub options: Vec<ResolvedOption>,
    executor: Arc<dyn Executor>,
}

impl fmt::Debug for ResolvedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedCommand")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl ResolvedCommand {
    pub fn executor(&self) -> Arc<dyn Executor> {
        Arc::clone(&self.executor)
    }

    pub fn option(&self, name: &str) -> Option<&ResolvedOption> {
        self.options.iter().find(|o| o.name == name)
    }

    /// clap subcommand for this command.
    pub fn subcommand(&self) -> clap::Command {
        let mut command = clap::Command::new(self.name.clone()).arg(
            Arg::new(EXTRA_ARGS)
                .action(ArgAction::Append)
                .value_parser(value_parser!(OsString))
                .hide(true),
        );
        if !self.description.is_empty() {
            command = command.about(self.description.clone());
        }
        command.args(self.options.iter().map(ResolvedOption::arg))
    }

    /// Build the executor's command object from the subcommand matches.
    ///
    /// Only declared options are carried; options without a value are left out.
    pub fn invocation(&self, matches: &ArgMatches) -> Invocation {
        let mut invocation = Invocation::new(self.name.clone());
        for option in &self.options {
            if let Some(value) = option.value_of(matches) {
                invocation.options.insert(option.name.clone(), value);
            }
        }
        invocation
    }

    /// Drop flags this command does not declare, together with their value.
    ///
    /// `args` are the tokens after the command name. Everything after `--` is kept.
    pub fn retain_declared(&self, args: &[OsString]) -> Vec<OsString> {
        let mut kept = Vec::with_capacity(args.len());
        let mut iter = args.iter().peekable();

        while let Some(arg) = iter.next() {
            let Some(token) = arg.to_str() else {
                kept.push(arg.clone());
                continue;
            };
            if token == "--" {
                kept.push(arg.clone());
                kept.extend(iter.by_ref().cloned());
                break;
            }
            if !token.starts_with('-') || token == "-" {
                kept.push(arg.clone());
                continue;
            }

            let inline_value = if token.starts_with("--") {
                token.contains('=')
            } else {
                token.chars().count() > 2
            };

            match self.flag(token) {
                Flag::Declared(option) if option.takes_value() => {
                    kept.push(arg.clone());
                    if !inline_value {
                        if let Some(value) = iter.next() {
                            kept.push(value.clone());
                        }
                    }
                }
                Flag::Declared(option) => {
                    // `--flag false` reads as `--flag=false`
                    let value = iter
                        .peek()
                        .and_then(|next| next.to_str())
                        .filter(|_| !inline_value)
                        .and_then(boolish);
                    match value {
                        Some(value) => {
                            iter.next();
                            kept.push(OsString::from(format!("--{}={}", option.name, value)));
                        }
                        None => kept.push(arg.clone()),
                    }
                }
                Flag::Help => kept.push(arg.clone()),
                Flag::Unknown => {
                    debug!("retain_declared: ignoring {} for {}", token, self.name);
                    let next_is_value = iter
                        .peek()
                        .and_then(|next| next.to_str())
                        .is_some_and(|next| !next.starts_with('-'));
                    if !inline_value && next_is_value {
                        iter.next();
                    }
                }
            }
        }
        kept
    }

    fn flag(&self, token: &str) -> Flag<'_> {
        if let Some(long) = token.strip_prefix("--") {
            let name = long.split('=').next().unwrap_or_default();
            if name == "help" {
                return Flag::Help;
            }
            return self
                .options
                .iter()
                .find(|o| o.name == name || o.long_alias() == Some(name))
                .map_or(Flag::Unknown, Flag::Declared);
        }

        match token.chars().nth(1) {
            Some('h') => Flag::Help,
            Some(c) => self
                .options
                .iter()
                .find(|o| o.short() == Some(c))
                .map_or(Flag::Unknown, Flag::Declared),
            None => Flag::Unknown,
        }
    }
}

/// Service binding inventory commands to executors.
pub struct CommandResolver {
    working_dir: PathBuf,
    registry: ExecutorRegistry,
    fs: Arc<dyn FileSystem>,
    runner: Arc<dyn CommandRunner>,
    external_executors: bool,
}

impl CommandResolver {
    pub fn new(
        working_dir: &Path,
        registry: ExecutorRegistry,
        fs: Arc<dyn FileSystem>,
        runner: Arc<dyn CommandRunner>,
        settings: &Settings,
    ) -> Self {
        Self {
            working_dir: working_dir.to_path_buf(),
            registry,
            fs,
            runner,
            external_executors: settings.external_executors,
        }
    }

    /// Resolve one inventory command.
    ///
    /// Without declared options the description is kept as is; otherwise it
    /// is prefixed with one `[--name]` / `[--name, -alias]` hint per option.
    #[instrument(skip_all, fields(command = ?spec.name))]
    pub fn parse_command(&self, spec: &CommandSpec) -> ApplicationResult<ResolvedCommand> {
        let name = spec
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or(DomainError::MissingCommandName)?
            .to_string();

        let executor = self.resolve_executor(&name, spec.executor.as_deref())?;
        let original = spec.description.clone().unwrap_or_default();

        if spec.options.is_empty() {
            return Ok(ResolvedCommand {
                name,
                description: original,
                options: Vec::new(),
                executor,
            });
        }

        let options: Vec<ResolvedOption> = spec.options.iter().map(ResolvedOption::from_spec).collect();
        validate_options(&name, &options)?;

        let hints = options.iter().map(ResolvedOption::flag_hint).join(" ");
        let description = if original.is_empty() {
            hints
        } else {
            format!("{} {}", hints, original)
        };
        debug!("parse_command: {} options={}", name, options.len());

        Ok(ResolvedCommand {
            name,
            description,
            options,
            executor,
        })
    }

    fn resolve_executor(&self, command: &str, path: Option<&str>) -> ApplicationResult<Arc<dyn Executor>> {
        let invalid = |reason: String| ApplicationError::InvalidExecutor {
            command: command.to_string(),
            reason,
        };

        let path = path
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| invalid("no `executor` declared".to_string()))?;

        if let Some(executor) = self.registry.get(path) {
            debug!("resolve_executor: {} -> registered {}", command, path);
            return Ok(executor);
        }
        if !self.external_executors {
            return Err(invalid(format!("`{}` is not registered", path)));
        }

        let program = self.working_dir.join(executor_key(path));
        if !self.fs.exists(&program) {
            return Err(invalid(format!(
                "`{}` is not registered and {} does not exist",
                path,
                program.display()
            )));
        }
        if !self.fs.is_file(&program) {
            return Err(invalid(format!("{} is not a file", program.display())));
        }
        if !self.fs.is_executable(&program) {
            return Err(invalid(format!("{} is not executable", program.display())));
        }

        debug!("resolve_executor: {} -> {}", command, program.display());
        Ok(Arc::new(ExternalExecutor::new(
            program,
            self.working_dir.clone(),
            Arc::clone(&self.runner),
        )))
    }
}

fn validate_options(command: &str, options: &[ResolvedOption]) -> Result<(), DomainError> {
    let mut seen = HashSet::new();
    for option in options {
        let invalid_name = std::iter::once(option.name.as_str())
            .chain(option.alias.as_deref())
            .find(|name| !is_flag_name(name));
        if let Some(name) = invalid_name {
            return Err(DomainError::InvalidOptionName {
                command: command.to_string(),
                option: name.to_string(),
            });
        }

        let reserved = option.name == "help"
            || option.short() == Some('h')
            || option.long_alias() == Some("help");
        if reserved {
            return Err(DomainError::ReservedOption {
                command: command.to_string(),
                option: option.name.clone(),
            });
        }

        let mut flags = vec![format!("--{}", option.name)];
        if let Some(short) = option.short() {
            flags.push(format!("-{}", short));
        } else if let Some(alias) = option.long_alias() {
            flags.push(format!("--{}", alias));
        }
        if !flags.into_iter().all(|flag| seen.insert(flag)) {
            return Err(DomainError::DuplicateOption {
                command: command.to_string(),
                option: option.name.clone(),
            });
        }

        if let Some(default) = option.default.as_ref().filter(|d| !default_fits(option.value_type, d)) {
            return Err(DomainError::InvalidDefault {
                command: command.to_string(),
                option: option.name.clone(),
                default: default.to_string(),
                expected: option.value_type.to_string(),
            });
        }
    }
    Ok(())
}

fn is_flag_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('-')
        && !name.contains(|c: char| c.is_whitespace() || c == '=')
}

/// Whether `default` parses the way a command-line value of `value_type` would.
fn default_fits(value_type: OptionType, default: &OptionValue) -> bool {
    let text = default.to_string();
    match value_type {
        OptionType::String => true,
        OptionType::Integer => text.parse::<i64>().is_ok(),
        OptionType::Number => text.parse::<f64>().is_ok(),
        OptionType::Boolean => boolish(&text).is_some(),
    }
}
