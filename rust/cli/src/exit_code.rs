//! Process exit codes.

pub const SUCCESS: i32 = 0;

/// Any failure: bad arguments, unreadable input, rejected records.
pub const ERROR: i32 = 2;

/// Interrupted by user (Ctrl+C) or by a configured break point.
pub const INTERRUPTED: i32 = 130;
