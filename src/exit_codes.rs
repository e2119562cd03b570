//! Exit code constants for the profgate CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, IO failure, invalid state)
//! - 2: Profile is locked by another process
//! - 3: Profile is in active use by other processes

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, IO failure, or invalid state.
pub const USER_ERROR: i32 = 1;

/// Another process holds (or is taking) the exclusive profile lock.
pub const PROFILE_LOCKED: i32 = 2;

/// Other processes hold access records that block an exclusive lock.
pub const PROFILE_IN_USE: i32 = 3;
