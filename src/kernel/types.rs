//! Core type definitions for the kernel
//!
//! These types provide strong typing for the synchronization primitives.

/// Tick counter / timeout type
pub type OsTick = u32;

/// Semaphore counter type
///
/// Signed on purpose: a negative counter encodes the number of threads
/// queued on the semaphore (`-counter` waiters).
pub type OsSemCnt = i32;

/// Mailbox message type (one machine word)
pub type OsMsg = usize;

/// Interrupt nesting counter
pub type OsNestingCnt = u8;

/// Non-blocking probe: fail immediately instead of waiting
pub const TIMEOUT_IMMEDIATE: OsTick = 0;

/// Wait forever: the timeout path is disabled
pub const TIMEOUT_INFINITE: OsTick = OsTick::MAX;

/// Wakeup word of a queued waiter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OsPendStatus {
    /// Still queued, no wakeup yet
    Pending = 0,
    /// Woken by a signal
    Ok = 1,
    /// Woken because the object was reset
    Reset = 2,
}
