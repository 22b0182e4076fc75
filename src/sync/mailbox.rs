//! Mailbox — bounded queue of message words
//!
//! A fixed-capacity ring of machine words guarded by two counting
//! semaphores: `free` counts empty slots (posters wait on it), `used`
//! counts queued messages (fetchers wait on it). By construction every
//! successful post consumes one free slot and produces one used slot, so
//! `free + used == capacity` holds at every quiescent point — the classic
//! bounded buffer without a separate mutex. The critical section protects
//! only the O(1) index/slot update, never a blocking wait.
//!
//! Lifecycle: `init` makes the mailbox active; `reset` flushes all waiters
//! with status Reset and suspends the mailbox (every operation fails with
//! Reset until `resume`); `resume` re-arms it empty.

use core::cell::UnsafeCell;
use core::ptr;

use crate::critical::{os_sys_lock, os_sys_unlock};
use crate::error::{OsError, OsResult};
use crate::sync::sem::OsSem;
use crate::types::{OsMsg, OsSemCnt, OsTick};
use crate::{os_dbg_assert, os_dbg_check_locked, os_dbg_check_thread};

/// Mailbox kernel object
pub struct OsMailbox {
    /// Caller-owned message buffer
    buf: *mut OsMsg,
    /// Capacity in messages
    size: usize,
    /// Write index (next post slot)
    wr: usize,
    /// Read index (next fetch slot)
    rd: usize,
    /// Counts free slots, posters block here
    free: OsSem,
    /// Counts queued messages, fetchers block here
    used: OsSem,
    /// Reset-suspended flag
    reset: bool,
}

unsafe impl Send for OsMailbox {}

impl OsMailbox {
    /// Create an uninitialized mailbox; call [`OsMailbox::init`] before use
    pub const fn new() -> Self {
        OsMailbox {
            buf: ptr::null_mut(),
            size: 0,
            wr: 0,
            rd: 0,
            free: OsSem::new(0),
            used: OsSem::new(0),
            reset: false,
        }
    }

    /// Initialize with a caller-owned buffer of `n` message slots
    ///
    /// The mailbox becomes active and empty: `free == n`, `used == 0`.
    ///
    /// # Safety
    /// `buf` must be valid for reads and writes of `n` messages for the
    /// whole lifetime of the mailbox, and must not be aliased while the
    /// mailbox lives.
    pub unsafe fn init(&mut self, buf: *mut OsMsg, n: usize) {
        os_dbg_assert!(!buf.is_null(), "mailbox buffer is null");
        os_dbg_assert!(n > 0, "mailbox capacity is zero");

        self.buf = buf;
        self.size = n;
        self.wr = 0;
        self.rd = 0;
        self.free.init(n as OsSemCnt);
        self.used.init(0);
        self.reset = false;
    }

    /// Capacity in messages
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Free slot count snapshot (I-class)
    #[inline(always)]
    pub fn free_count(&self) -> OsSemCnt {
        self.free.counter()
    }

    /// Queued message count snapshot (I-class)
    #[inline(always)]
    pub fn used_count(&self) -> OsSemCnt {
        self.used.counter()
    }

    /// Read the next message without consuming it (I-class)
    pub fn peek_i(&self) -> OsResult<OsMsg> {
        os_dbg_check_locked!();

        if self.reset {
            return Err(OsError::Reset);
        }
        if self.used.counter() <= 0 {
            return Err(OsError::Timeout);
        }
        Ok(unsafe { *self.buf.add(self.rd) })
    }

    // ============ Post ============

    /// S-class post: the caller holds the lock, may suspend
    pub fn post_s(&mut self, msg: OsMsg, timeout: OsTick) -> OsResult<()> {
        os_dbg_check_locked!();

        if self.reset {
            return Err(OsError::Reset);
        }
        self.free.wait_s(timeout)?;
        // The lock may have been dropped while parked; the mailbox can
        // have been reset in the meantime.
        if self.reset {
            return Err(OsError::Reset);
        }

        unsafe { *self.buf.add(self.wr) = msg };
        self.wr += 1;
        if self.wr >= self.size {
            self.wr = 0;
        }
        self.used.signal_i();
        Ok(())
    }

    /// Post a message (thread context)
    ///
    /// Blocks up to `timeout` ticks for a free slot.
    pub fn post(&mut self, msg: OsMsg, timeout: OsTick) -> OsResult<()> {
        os_dbg_check_thread!();

        os_sys_lock();
        let res = self.post_s(msg, timeout);
        os_sys_unlock();
        res
    }

    /// I-class post: non-blocking, fails with Timeout when full
    pub fn post_i(&mut self, msg: OsMsg) -> OsResult<()> {
        os_dbg_check_locked!();

        if self.reset {
            return Err(OsError::Reset);
        }
        self.free.wait_i()?;

        unsafe { *self.buf.add(self.wr) = msg };
        self.wr += 1;
        if self.wr >= self.size {
            self.wr = 0;
        }
        self.used.signal_i();
        Ok(())
    }

    // ============ Ahead post ============

    /// S-class urgent post: the message becomes the next one fetched
    ///
    /// The relative order of two racing ahead-posts is unspecified; it
    /// follows lock acquisition order.
    pub fn post_ahead_s(&mut self, msg: OsMsg, timeout: OsTick) -> OsResult<()> {
        os_dbg_check_locked!();

        if self.reset {
            return Err(OsError::Reset);
        }
        self.free.wait_s(timeout)?;
        if self.reset {
            return Err(OsError::Reset);
        }

        self.rd = if self.rd == 0 { self.size - 1 } else { self.rd - 1 };
        unsafe { *self.buf.add(self.rd) = msg };
        self.used.signal_i();
        Ok(())
    }

    /// Urgent post (thread context)
    pub fn post_ahead(&mut self, msg: OsMsg, timeout: OsTick) -> OsResult<()> {
        os_dbg_check_thread!();

        os_sys_lock();
        let res = self.post_ahead_s(msg, timeout);
        os_sys_unlock();
        res
    }

    /// I-class urgent post: non-blocking, fails with Timeout when full
    pub fn post_ahead_i(&mut self, msg: OsMsg) -> OsResult<()> {
        os_dbg_check_locked!();

        if self.reset {
            return Err(OsError::Reset);
        }
        self.free.wait_i()?;

        self.rd = if self.rd == 0 { self.size - 1 } else { self.rd - 1 };
        unsafe { *self.buf.add(self.rd) = msg };
        self.used.signal_i();
        Ok(())
    }

    // ============ Fetch ============

    /// S-class fetch: the caller holds the lock, may suspend
    pub fn fetch_s(&mut self, timeout: OsTick) -> OsResult<OsMsg> {
        os_dbg_check_locked!();

        if self.reset {
            return Err(OsError::Reset);
        }
        self.used.wait_s(timeout)?;
        if self.reset {
            return Err(OsError::Reset);
        }

        let msg = unsafe { *self.buf.add(self.rd) };
        self.rd += 1;
        if self.rd >= self.size {
            self.rd = 0;
        }
        self.free.signal_i();
        Ok(msg)
    }

    /// Fetch the oldest message (thread context)
    ///
    /// Blocks up to `timeout` ticks for a message.
    pub fn fetch(&mut self, timeout: OsTick) -> OsResult<OsMsg> {
        os_dbg_check_thread!();

        os_sys_lock();
        let res = self.fetch_s(timeout);
        os_sys_unlock();
        res
    }

    /// I-class fetch: non-blocking, fails with Timeout when empty
    pub fn fetch_i(&mut self) -> OsResult<OsMsg> {
        os_dbg_check_locked!();

        if self.reset {
            return Err(OsError::Reset);
        }
        self.used.wait_i()?;

        let msg = unsafe { *self.buf.add(self.rd) };
        self.rd += 1;
        if self.rd >= self.size {
            self.rd = 0;
        }
        self.free.signal_i();
        Ok(msg)
    }

    // ============ Reset / resume ============

    /// I-class reset
    ///
    /// Realigns both indices to the buffer base, wakes every blocked
    /// poster and fetcher with status Reset and suspends the mailbox:
    /// all operations fail with Reset until [`OsMailbox::resume_i`].
    pub fn reset_i(&mut self) {
        os_dbg_check_locked!();

        self.wr = 0;
        self.rd = 0;
        self.reset = true;
        self.free.reset_i(0);
        self.used.reset_i(0);
    }

    /// Reset the mailbox (thread context)
    pub fn reset(&mut self) {
        os_sys_lock();
        self.reset_i();
        os_sys_unlock();
    }

    /// I-class resume: back to active, empty
    ///
    /// Counters are re-armed to `free == capacity`, `used == 0`; the
    /// indices were already realigned by the preceding reset.
    pub fn resume_i(&mut self) {
        os_dbg_check_locked!();

        if !self.reset {
            return;
        }
        self.reset = false;
        self.free.init(self.size as OsSemCnt);
        self.used.init(0);
    }

    /// Resume the mailbox (thread context)
    pub fn resume(&mut self) {
        os_sys_lock();
        self.resume_i();
        os_sys_unlock();
    }

    #[cfg(test)]
    pub(crate) fn indices(&self) -> (usize, usize) {
        (self.rd, self.wr)
    }
}

impl Default for OsMailbox {
    fn default() -> Self {
        Self::new()
    }
}

// ============ Safe Wrapper ============

/// Statically declarable mailbox
///
/// Bound to a `'static` buffer at [`Mailbox::create`] time. Interior
/// mutability in the kernel-object style; every entry point takes (or
/// asserts) the critical section.
pub struct Mailbox {
    inner: UnsafeCell<OsMailbox>,
}

unsafe impl Sync for Mailbox {}
unsafe impl Send for Mailbox {}

impl Mailbox {
    pub const fn new() -> Self {
        Mailbox {
            inner: UnsafeCell::new(OsMailbox::new()),
        }
    }

    /// Bind the mailbox to its buffer and activate it
    pub fn create(&self, buffer: &'static mut [OsMsg]) {
        unsafe { (*self.inner.get()).init(buffer.as_mut_ptr(), buffer.len()) }
    }

    pub fn post(&self, msg: OsMsg, timeout: OsTick) -> OsResult<()> {
        unsafe { (*self.inner.get()).post(msg, timeout) }
    }

    pub fn post_ahead(&self, msg: OsMsg, timeout: OsTick) -> OsResult<()> {
        unsafe { (*self.inner.get()).post_ahead(msg, timeout) }
    }

    pub fn post_i(&self, msg: OsMsg) -> OsResult<()> {
        unsafe { (*self.inner.get()).post_i(msg) }
    }

    pub fn post_ahead_i(&self, msg: OsMsg) -> OsResult<()> {
        unsafe { (*self.inner.get()).post_ahead_i(msg) }
    }

    pub fn fetch(&self, timeout: OsTick) -> OsResult<OsMsg> {
        unsafe { (*self.inner.get()).fetch(timeout) }
    }

    pub fn fetch_i(&self) -> OsResult<OsMsg> {
        unsafe { (*self.inner.get()).fetch_i() }
    }

    pub fn peek_i(&self) -> OsResult<OsMsg> {
        unsafe { (*self.inner.get()).peek_i() }
    }

    pub fn reset(&self) {
        unsafe { (*self.inner.get()).reset() }
    }

    pub fn resume(&self) {
        unsafe { (*self.inner.get()).resume() }
    }

    pub fn size(&self) -> usize {
        unsafe { (*self.inner.get()).size() }
    }

    pub fn free_count(&self) -> OsSemCnt {
        unsafe { (*self.inner.get()).free_count() }
    }

    pub fn used_count(&self) -> OsSemCnt {
        unsafe { (*self.inner.get()).used_count() }
    }
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::critical::critical_section;
    use crate::types::TIMEOUT_IMMEDIATE;

    fn make_mailbox(buf: &mut [OsMsg]) -> OsMailbox {
        let mut mb = OsMailbox::new();
        unsafe { mb.init(buf.as_mut_ptr(), buf.len()) };
        mb
    }

    #[test]
    fn indices_realign_after_full_drain() {
        let mut buf = [0 as OsMsg; 4];
        let mut mb = make_mailbox(&mut buf);

        for i in 0..4 {
            assert_eq!(mb.post(i, TIMEOUT_IMMEDIATE), Ok(()));
        }
        for i in 0..4 {
            assert_eq!(mb.fetch(TIMEOUT_IMMEDIATE), Ok(i));
        }
        assert_eq!(mb.indices(), (0, 0));
        assert_eq!(mb.free_count(), 4);
        assert_eq!(mb.used_count(), 0);
    }

    #[test]
    fn ahead_post_wraps_read_index_below_base() {
        let mut buf = [0 as OsMsg; 4];
        let mut mb = make_mailbox(&mut buf);

        // rd == 0, so an ahead post lands in the last slot.
        assert_eq!(mb.post_ahead(7, TIMEOUT_IMMEDIATE), Ok(()));
        assert_eq!(mb.indices(), (3, 0));
        assert_eq!(mb.fetch(TIMEOUT_IMMEDIATE), Ok(7));
        assert_eq!(mb.indices(), (0, 0));
    }

    #[test]
    fn reset_suspends_until_resume() {
        let mut buf = [0 as OsMsg; 2];
        let mut mb = make_mailbox(&mut buf);

        assert_eq!(mb.post(1, TIMEOUT_IMMEDIATE), Ok(()));
        mb.reset();

        assert_eq!(mb.post(2, TIMEOUT_IMMEDIATE), Err(OsError::Reset));
        assert_eq!(mb.fetch(TIMEOUT_IMMEDIATE), Err(OsError::Reset));
        critical_section(|_| {
            assert_eq!(mb.post_i(2), Err(OsError::Reset));
            assert_eq!(mb.fetch_i(), Err(OsError::Reset));
            assert_eq!(mb.peek_i(), Err(OsError::Reset));
        });
        assert_eq!(mb.indices(), (0, 0));

        mb.resume();
        assert_eq!(mb.free_count(), 2);
        assert_eq!(mb.used_count(), 0);
        assert_eq!(mb.post(3, TIMEOUT_IMMEDIATE), Ok(()));
        assert_eq!(mb.fetch(TIMEOUT_IMMEDIATE), Ok(3));
    }

    #[test]
    fn peek_does_not_consume() {
        let mut buf = [0 as OsMsg; 2];
        let mut mb = make_mailbox(&mut buf);

        assert_eq!(mb.post(42, TIMEOUT_IMMEDIATE), Ok(()));
        critical_section(|_| {
            assert_eq!(mb.peek_i(), Ok(42));
            assert_eq!(mb.peek_i(), Ok(42));
        });
        assert_eq!(mb.used_count(), 1);
        assert_eq!(mb.fetch(TIMEOUT_IMMEDIATE), Ok(42));
        critical_section(|_| assert_eq!(mb.peek_i(), Err(OsError::Timeout)));
    }
}
