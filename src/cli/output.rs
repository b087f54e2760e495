//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;

use crate::cli::CliError;

/// Render the error banner: `Error:` header and an indented `✗ <message>` line.
pub fn error_banner(msg: &(impl std::fmt::Display + ?Sized)) -> String {
    format!("{}\n  {} {}\n", "Error:".red().bold(), "✗".red(), msg)
}

/// Print error banner to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprint!("{}", error_banner(msg));
}

/// Report `err` on stderr and terminate with its exit code.
///
/// The single sink for every `CliError`.
pub fn stop_with_error(err: &CliError) -> ! {
    tracing::debug!("stop_with_error: {:?}", err);
    error(err);
    std::process::exit(err.exit_code())
}
