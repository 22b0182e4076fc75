//! Driver synchronization pattern
//!
//! Every peripheral driver built on this kernel follows the same finite
//! state machine: `Stop` (hardware off) → `Ready` (configured, idle) →
//! one or more `Active*` states while an operation is in flight → back to
//! `Ready` on completion. Public entry points assert their state
//! precondition, perform the transition under the system lock, and invoke
//! the hardware-specific (`lld`) routine exactly once per transition.
//! ISR trampolines run with the lock held via the `_from_isr` pair and
//! use only I-class kernel calls to hand data to thread context.
//!
//! [`com::ComDriver`] is the reusable embodiment of the pattern: a
//! word-oriented communication driver parameterized over its low-level
//! half, bridging receive interrupts to a thread through a mailbox.

pub mod com;

pub use com::{ComDriver, ComLld};

use crate::os_dbg_assert;

/// Driver lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Hardware off, not configured
    Stop,
    /// Configured and idle
    Ready,
    /// Transmit operation in flight
    ActiveTx,
    /// Receive operation in flight
    ActiveRx,
}

impl DriverState {
    /// Debug-assert that the current state is one of `allowed`.
    ///
    /// State preconditions are programmer errors, not runtime errors.
    #[inline]
    pub fn require(self, allowed: &[DriverState]) {
        os_dbg_assert!(
            allowed.contains(&self),
            "driver operation in invalid state"
        );
    }
}
