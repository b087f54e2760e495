//! Infrastructure layer: I/O implementations
//!
//! This layer implements the I/O boundary traits the services depend on.

pub mod traits;

pub use traits::{CommandRunner, FileSystem, RealCommandRunner, RealFileSystem};
