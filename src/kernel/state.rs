//! Global kernel state
//!
//! Tracks the tick counter and the interrupt nesting level. There is no
//! scheduler here: thread suspension is delegated to the port layer, and
//! the kernel state is deliberately small.

use portable_atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

use crate::os_dbg_assert;
use crate::types::{OsNestingCnt, OsTick};

/// Atomic kernel state words
pub struct KernelState {
    initialized: AtomicBool,
    int_nesting: AtomicU8,
    tick_counter: AtomicU32,
}

impl KernelState {
    const fn new() -> Self {
        Self {
            initialized: AtomicBool::new(false),
            int_nesting: AtomicU8::new(0),
            tick_counter: AtomicU32::new(0),
        }
    }

    pub(crate) fn reset(&self) {
        self.initialized.store(false, Ordering::SeqCst);
        self.int_nesting.store(0, Ordering::SeqCst);
        self.tick_counter.store(0, Ordering::SeqCst);
    }

    /// Check if the kernel was initialized
    #[inline(always)]
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Get the current tick count
    #[inline(always)]
    pub fn tick_get(&self) -> OsTick {
        self.tick_counter.load(Ordering::Relaxed)
    }

    /// Get the interrupt nesting level
    #[inline(always)]
    pub fn int_nesting(&self) -> OsNestingCnt {
        self.int_nesting.load(Ordering::Relaxed)
    }

    /// Increment and return the tick count
    #[inline(always)]
    pub(crate) fn tick_increment(&self) -> OsTick {
        self.tick_counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    #[inline(always)]
    pub(crate) fn set_initialized(&self, val: bool) {
        self.initialized.store(val, Ordering::SeqCst);
    }

    #[inline(always)]
    pub(crate) fn int_enter(&self) {
        let nesting = self.int_nesting.fetch_add(1, Ordering::Relaxed);
        os_dbg_assert!(nesting < OsNestingCnt::MAX, "interrupt nesting overflow");
    }

    #[inline(always)]
    pub(crate) fn int_exit(&self) {
        let nesting = self.int_nesting.load(Ordering::Relaxed);
        os_dbg_assert!(nesting > 0, "interrupt exit without matching enter");
        if nesting > 0 {
            self.int_nesting.store(nesting - 1, Ordering::Relaxed);
        }
    }
}

/// Global kernel state instance
pub static KERNEL: KernelState = KernelState::new();

/// Initialize the kernel state
///
/// Must be called once before the tick source is started and before any
/// timed wait is issued.
pub fn os_init() {
    KERNEL.reset();
    KERNEL.set_initialized(true);
}

/// Enter ISR context
///
/// Call at the top of every interrupt handler that uses kernel services.
#[inline]
pub fn os_int_enter() {
    KERNEL.int_enter();
}

/// Leave ISR context
#[inline]
pub fn os_int_exit() {
    KERNEL.int_exit();
}
