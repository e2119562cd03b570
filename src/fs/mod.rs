//! Filesystem helpers for profgate.

mod atomic;

pub use atomic::atomic_write_file;
