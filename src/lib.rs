//! Declarative CLI builder.
//!
//! A YAML inventory in the working directory names the tool and its
//! commands; the host package manifest supplies the version. From these the
//! crate derives the full command-line surface (commands, options, help,
//! version) and dispatches each invocation to the executor the inventory
//! binds to the command.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use application::{Executor, ExecutorError, ExecutorRegistry, ExecutorResult};
pub use cli::{App, CliError, CliResult, Dispatch};
pub use config::Settings;
pub use domain::{Invocation, OptionValue};
