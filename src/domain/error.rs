//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent inventory rule violations.
/// These are independent of file and process concerns.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("inventory does not declare a `name`")]
    MissingName,

    #[error("inventory declares no commands")]
    NoCommands,

    #[error("a command in the inventory has no `name`")]
    MissingCommandName,

    #[error("`{name}` is not declared as an executable in the package manifest (declared: {declared})")]
    UnboundCommandName { name: String, declared: String },

    #[error("option `{option}` of command `{command}` clashes with the built-in help flag")]
    ReservedOption { command: String, option: String },

    #[error("option `{option}` is declared more than once for command `{command}`")]
    DuplicateOption { command: String, option: String },

    #[error("option name `{option}` of command `{command}` is not a valid flag name")]
    InvalidOptionName { command: String, option: String },

    #[error("default `{default}` of option `{option}` in command `{command}` is not a valid {expected}")]
    InvalidDefault {
        command: String,
        option: String,
        default: String,
        expected: String,
    },
}
