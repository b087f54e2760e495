//! Application layer: services and executors
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod error;
pub mod error_ext;
pub mod executor;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use executor::{Executor, ExecutorError, ExecutorRegistry, ExecutorResult, ExternalExecutor};
