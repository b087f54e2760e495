//! CLI layer: root parser configuration, dispatch and error reporting

pub mod app;
pub mod blueprint;
pub mod dispatch;
pub mod error;
pub mod output;

pub use app::App;
pub use blueprint::{initialize_cli, CliBlueprint};
pub use dispatch::{Dispatch, Dispatcher};
pub use error::{CliError, CliResult};
pub use output::stop_with_error;
