//! CLI-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        CliError::Application(e.into())
    }
}

impl From<clap::Error> for CliError {
    fn from(e: clap::Error) -> Self {
        let rendered = e.to_string();
        let message = rendered
            .lines()
            .next()
            .unwrap_or_default()
            .trim_start_matches("error:")
            .trim();
        CliError::InvalidArgs(message.to_string())
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        crate::exitcode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_domain_error_when_converting_then_message_preserved() {
        let err = CliError::from(DomainError::NoCommands);
        assert_eq!(err.to_string(), "inventory declares no commands");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn given_clap_error_when_converting_then_prefix_stripped() {
        let clap_err = clap::Command::new("tool")
            .try_get_matches_from(["tool", "--nope"])
            .unwrap_err();
        let err = CliError::from(clap_err);
        let message = err.to_string();
        assert!(message.starts_with("invalid arguments: "), "{}", message);
        assert!(message.contains("--nope"), "{}", message);
    }
}
