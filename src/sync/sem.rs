//! Counting semaphore
//!
//! The counter is signed: a negative value encodes queued waiters
//! (`-counter` threads are blocked, in FIFO order). All counter and queue
//! mutation happens inside the system critical section.
//!
//! Entry-point classes follow the kernel convention:
//! - plain: thread context, takes the lock itself, may suspend;
//! - `_s` suffix: caller already holds the lock, may suspend (the lock is
//!   transiently released while the caller is parked);
//! - `_i` suffix: caller already holds the lock, never suspends — the only
//!   class legal from ISR trampolines.

use core::cell::UnsafeCell;
use core::ptr::NonNull;

use crate::critical::{os_sys_lock, os_sys_unlock};
use crate::error::{OsError, OsResult};
use crate::port;
use crate::sync::queue::{OsWaiter, WaitQueue};
use crate::time;
use crate::types::{OsPendStatus, OsSemCnt, OsTick, TIMEOUT_IMMEDIATE, TIMEOUT_INFINITE};
use crate::{os_dbg_assert, os_dbg_check_locked, os_dbg_check_thread};

/// Counting semaphore
pub struct OsSem {
    /// Counter; negative values count queued waiters
    cnt: OsSemCnt,
    /// Blocked threads, oldest first
    queue: WaitQueue,
}

impl OsSem {
    /// Create a new semaphore with the given initial counter
    pub const fn new(cnt: OsSemCnt) -> Self {
        OsSem {
            cnt,
            queue: WaitQueue::new(),
        }
    }

    /// Reinitialize the semaphore
    ///
    /// Must not be called while threads are queued; use [`OsSem::reset_i`]
    /// to flush waiters first.
    pub fn init(&mut self, cnt: OsSemCnt) {
        os_dbg_assert!(self.queue.is_empty(), "semaphore reinit with queued waiters");
        self.cnt = cnt;
        self.queue.init();
    }

    /// I-class non-blocking acquire
    ///
    /// Takes one count if available, otherwise fails with `Timeout`
    /// immediately. Never enqueues the caller.
    pub fn wait_i(&mut self) -> OsResult<()> {
        os_dbg_check_locked!();

        if self.cnt > 0 {
            self.cnt -= 1;
            Ok(())
        } else {
            Err(OsError::Timeout)
        }
    }

    /// Wait on the semaphore (thread context)
    ///
    /// * `TIMEOUT_IMMEDIATE` — single non-blocking probe.
    /// * `TIMEOUT_INFINITE` — wait until signalled or reset.
    /// * anything else — bounded wait in ticks.
    pub fn wait(&mut self, timeout: OsTick) -> OsResult<()> {
        os_dbg_check_thread!();

        os_sys_lock();
        let res = self.wait_s(timeout);
        os_sys_unlock();
        res
    }

    /// S-class wait: the caller holds the lock
    ///
    /// If the caller must be parked, the lock is released while parked and
    /// re-acquired before returning, so the caller's view of other state it
    /// guarded is stale after a blocking return.
    pub fn wait_s(&mut self, timeout: OsTick) -> OsResult<()> {
        os_dbg_check_locked!();

        if self.cnt > 0 {
            self.cnt -= 1;
            return Ok(());
        }

        if timeout == TIMEOUT_IMMEDIATE {
            return Err(OsError::Timeout);
        }

        self.cnt -= 1;

        let mut waiter = OsWaiter::new();
        self.queue.insert(NonNull::from(&mut waiter));
        let start = time::os_tick_now();

        loop {
            os_sys_unlock();
            port::os_idle_wait();
            os_sys_lock();

            match waiter.status() {
                OsPendStatus::Ok => return Ok(()),
                OsPendStatus::Reset => return Err(OsError::Reset),
                OsPendStatus::Pending => {}
            }

            if timeout != TIMEOUT_INFINITE && time::os_tick_elapsed(start) >= timeout {
                // Timed out: withdraw the wait and repair the counter.
                self.queue.remove(NonNull::from(&mut waiter));
                self.cnt += 1;
                return Err(OsError::Timeout);
            }
        }
    }

    /// Signal the semaphore (thread context)
    pub fn signal(&mut self) {
        os_sys_lock();
        self.signal_i();
        os_sys_unlock();
    }

    /// I-class signal
    ///
    /// Increments the counter; if threads are queued, wakes the oldest one
    /// with status OK.
    pub fn signal_i(&mut self) {
        os_dbg_check_locked!();
        os_dbg_assert!(self.cnt < OsSemCnt::MAX, "semaphore counter overflow");

        self.cnt += 1;
        if self.cnt <= 0 {
            let front = self.queue.pop_front();
            os_dbg_assert!(front.is_some(), "semaphore counter out of sync with queue");
            if let Some(mut waiter) = front {
                unsafe { waiter.as_mut().status = OsPendStatus::Ok };
                port::os_event_signal();
            }
        }
    }

    /// Reset the semaphore (thread context)
    pub fn reset(&mut self, cnt: OsSemCnt) {
        os_sys_lock();
        self.reset_i(cnt);
        os_sys_unlock();
    }

    /// I-class reset
    ///
    /// Wakes **all** queued waiters with status Reset, discards the queue
    /// and sets the counter to `cnt`.
    pub fn reset_i(&mut self, cnt: OsSemCnt) {
        os_dbg_check_locked!();

        while let Some(mut waiter) = self.queue.pop_front() {
            unsafe { waiter.as_mut().status = OsPendStatus::Reset };
        }
        self.cnt = cnt;
        port::os_event_signal();
    }

    /// Raw counter snapshot
    ///
    /// Only meaningful as a free/used count when non-negative; take the
    /// lock around it for a consistent view with other state.
    #[inline(always)]
    pub fn counter(&self) -> OsSemCnt {
        self.cnt
    }
}

impl Default for OsSem {
    fn default() -> Self {
        Self::new(0)
    }
}

// ============ Safe Wrapper ============

/// Statically declarable semaphore
///
/// Interior mutability wrapper in the kernel-object style: the inner
/// `OsSem` is only ever mutated inside the critical section each entry
/// point takes (or asserts).
pub struct Semaphore {
    inner: UnsafeCell<OsSem>,
}

unsafe impl Sync for Semaphore {}
unsafe impl Send for Semaphore {}

impl Semaphore {
    pub const fn new(cnt: OsSemCnt) -> Self {
        Semaphore {
            inner: UnsafeCell::new(OsSem::new(cnt)),
        }
    }

    pub fn wait(&self, timeout: OsTick) -> OsResult<()> {
        unsafe { (*self.inner.get()).wait(timeout) }
    }

    pub fn wait_i(&self) -> OsResult<()> {
        unsafe { (*self.inner.get()).wait_i() }
    }

    pub fn signal(&self) {
        unsafe { (*self.inner.get()).signal() }
    }

    pub fn signal_i(&self) {
        unsafe { (*self.inner.get()).signal_i() }
    }

    pub fn reset(&self, cnt: OsSemCnt) {
        unsafe { (*self.inner.get()).reset(cnt) }
    }

    #[inline]
    pub fn counter(&self) -> OsSemCnt {
        unsafe { (*self.inner.get()).counter() }
    }
}

impl Default for Semaphore {
    fn default() -> Self {
        Self::new(0)
    }
}
