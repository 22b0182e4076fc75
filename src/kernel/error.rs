//! Error types for the kernel
//!
//! Uses Rust's Result pattern instead of C-style status words.
//!
//! Only recoverable conditions travel through this channel. Programming
//! errors (calling-convention or state-precondition violations) are debug
//! assertions, see [`crate::os_dbg_assert`].

/// Kernel error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OsError {
    /// A bounded wait expired before the object became available
    Timeout = 1,
    /// The object was reset while waiting, or is reset-suspended
    Reset = 2,
}

/// Result type alias for kernel operations
pub type OsResult<T> = Result<T, OsError>;
