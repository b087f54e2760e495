//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add file and resolution context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("working directory does not exist: {0}")]
    InvalidDirectory(PathBuf),

    #[error("no inventory found in {dir} (looked for {candidates})")]
    MissingManifest { dir: PathBuf, candidates: String },

    #[error("invalid inventory {path}: {message}")]
    InvalidManifest { path: PathBuf, message: String },

    #[error("inventory is empty: {0}")]
    EmptyManifest(PathBuf),

    #[error("no package manifest found in {dir} (looked for {candidates})")]
    MissingPackageManifest { dir: PathBuf, candidates: String },

    #[error("invalid package manifest {path}: {message}")]
    InvalidPackageManifest { path: PathBuf, message: String },

    #[error("invalid executor for command `{command}`: {reason}")]
    InvalidExecutor { command: String, reason: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
