//! Critical section handling — the system lock discipline
//!
//! All mutation of shared kernel objects (semaphore counters, wait queues,
//! mailbox indices) happens inside the critical section entered by
//! [`os_sys_lock`] and left by [`os_sys_unlock`]. ISR trampolines use the
//! `_from_isr` pair instead. Critical sections do not nest.
//!
//! The closure helper [`critical_section`] and the RAII [`CriticalSection`]
//! guard wrap the same primitives for application-level code.

use portable_atomic::{AtomicUsize, Ordering};

use crate::os_dbg_assert;

/// Number of threads currently inside the critical section.
///
/// On the target this is 0 or 1 (interrupts are disabled inside the
/// section); host test binaries may run several test threads, so a plain
/// boolean would race.
static LOCK_DEPTH: AtomicUsize = AtomicUsize::new(0);

/// Enter the system critical section (thread context).
#[inline(always)]
pub fn os_sys_lock() {
    #[cfg(target_arch = "arm")]
    cortex_m::interrupt::disable();

    LOCK_DEPTH.fetch_add(1, Ordering::Acquire);
}

/// Leave the system critical section (thread context).
#[inline(always)]
pub fn os_sys_unlock() {
    os_dbg_assert!(
        CriticalSection::is_active(),
        "critical section left without being entered"
    );
    LOCK_DEPTH.fetch_sub(1, Ordering::Release);

    #[cfg(target_arch = "arm")]
    unsafe {
        cortex_m::interrupt::enable()
    };
}

/// Enter the system critical section from an ISR trampoline.
#[inline(always)]
pub fn os_sys_lock_from_isr() {
    os_dbg_assert!(
        is_isr_context(),
        "ISR-class lock taken from thread context"
    );

    #[cfg(target_arch = "arm")]
    cortex_m::interrupt::disable();

    LOCK_DEPTH.fetch_add(1, Ordering::Acquire);
}

/// Leave the system critical section from an ISR trampoline.
#[inline(always)]
pub fn os_sys_unlock_from_isr() {
    LOCK_DEPTH.fetch_sub(1, Ordering::Release);

    #[cfg(target_arch = "arm")]
    unsafe {
        cortex_m::interrupt::enable()
    };
}

/// RAII guard for critical sections
///
/// Entering takes the system lock; dropping releases it.
pub struct CriticalSection {
    _private: (),
}

impl CriticalSection {
    /// Enter a critical section.
    #[inline(always)]
    pub fn enter() -> Self {
        os_sys_lock();
        CriticalSection { _private: () }
    }

    /// Check if any thread is currently inside a critical section
    #[inline(always)]
    pub fn is_active() -> bool {
        LOCK_DEPTH.load(Ordering::Acquire) > 0
    }
}

impl Drop for CriticalSection {
    #[inline(always)]
    fn drop(&mut self) {
        os_sys_unlock();
    }
}

/// Execute a closure inside the critical section
///
/// The closure receives a reference to the guard, which can be used to
/// access [`CsCell`](crate::kernel::cs_cell::CsCell) protected data.
#[inline]
pub fn critical_section<F, R>(f: F) -> R
where
    F: FnOnce(&CriticalSection) -> R,
{
    let cs = CriticalSection::enter();
    f(&cs)
}

/// Check if currently executing in an ISR context
///
/// On ARM this reads IPSR. On other targets it consults the kernel
/// interrupt-nesting counter, so host tests can simulate ISR context by
/// bracketing code in `os_int_enter`/`os_int_exit`.
#[inline]
pub fn is_isr_context() -> bool {
    #[cfg(target_arch = "arm")]
    {
        let ipsr: u32;
        unsafe {
            core::arch::asm!(
                "mrs {}, IPSR",
                out(reg) ipsr,
                options(nomem, nostack, preserves_flags)
            );
        }
        ipsr != 0
    }

    #[cfg(not(target_arch = "arm"))]
    {
        crate::kernel::state::KERNEL.int_nesting() > 0
    }
}
