//! Process exit codes

/// Successful termination
pub const OK: i32 = 0;

/// Any validation failure, unknown or missing command
pub const FAILURE: i32 = 1;
