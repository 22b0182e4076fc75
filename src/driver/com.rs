//! Word-oriented communication driver template
//!
//! Generic over [`ComLld`], the hardware-specific half (register access,
//! clock gating). The logical state machine, locking and the ISR-to-thread
//! handoff are identical across all targets; only the low-level half
//! differs and is selected by the target build.
//!
//! Received words flow: receive ISR → `on_receive_i` → rx mailbox →
//! `receive` in thread context. Hardware-reported errors accumulate in a
//! driver-local flags word and are surfaced by [`ComDriver::get_and_clear_errors`],
//! never panicked.

use crate::critical::critical_section;
use crate::error::OsResult;
use crate::sync::mailbox::Mailbox;
use crate::types::{OsMsg, OsTick};
use crate::{os_dbg_check_locked, os_dbg_check_thread};

use super::DriverState;

/// Hardware error flags
pub mod errflags {
    /// A received word was dropped because the rx mailbox was full
    pub const OVERRUN: u32 = 0x0001;
    /// Framing error reported by the hardware
    pub const FRAMING: u32 = 0x0002;
    /// Noise error reported by the hardware
    pub const NOISE: u32 = 0x0004;
}

/// Low-level driver interface
///
/// Implemented once per hardware unit. All methods are invoked with the
/// system locked, so they must be short and must not block.
pub trait ComLld {
    /// Hardware-specific configuration
    type Config;

    /// Apply the configuration and enable the peripheral
    fn start(&mut self, config: &Self::Config);

    /// Disable the peripheral and gate its clock
    fn stop(&mut self);

    /// Begin transmission of one word; completion arrives by interrupt
    fn transmit(&mut self, msg: OsMsg);

    /// Enable reception; received words arrive by interrupt
    fn start_receive(&mut self);
}

/// Communication driver
///
/// One instance per hardware unit, owned by the application and passed by
/// reference; no compile-time-conditional globals.
pub struct ComDriver<L: ComLld> {
    state: DriverState,
    lld: L,
    config: Option<L::Config>,
    rx_mbox: &'static Mailbox,
    errors: u32,
}

impl<L: ComLld> ComDriver<L> {
    /// Create a stopped driver bound to its receive mailbox
    ///
    /// The mailbox must be created (bound to its buffer) before the driver
    /// is started.
    pub const fn new(lld: L, rx_mbox: &'static Mailbox) -> Self {
        ComDriver {
            state: DriverState::Stop,
            lld,
            config: None,
            rx_mbox,
            errors: 0,
        }
    }

    /// Current lifecycle state
    #[inline(always)]
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Configure and start the driver
    ///
    /// Allowed in `Stop` (cold start) and `Ready` (reconfigure).
    pub fn start(&mut self, config: L::Config) {
        os_dbg_check_thread!();
        self.state.require(&[DriverState::Stop, DriverState::Ready]);

        critical_section(|_| {
            self.lld.start(&config);
            self.config = Some(config);
            self.state = DriverState::Ready;
        });
    }

    /// Stop the driver
    ///
    /// Allowed in `Stop` and `Ready`; stopping with an operation in flight
    /// is a precondition violation.
    pub fn stop(&mut self) {
        os_dbg_check_thread!();
        self.state.require(&[DriverState::Stop, DriverState::Ready]);

        critical_section(|_| {
            self.lld.stop();
            self.config = None;
            self.errors = 0;
            self.state = DriverState::Stop;
        });
    }

    /// Start transmitting one word
    ///
    /// Completion is reported by the ISR through
    /// [`ComDriver::on_transmit_complete_i`].
    pub fn transmit(&mut self, msg: OsMsg) {
        os_dbg_check_thread!();
        self.state.require(&[DriverState::Ready]);

        critical_section(|_| {
            self.state = DriverState::ActiveTx;
            self.lld.transmit(msg);
        });
    }

    /// Enable reception
    pub fn start_receive(&mut self) {
        os_dbg_check_thread!();
        self.state.require(&[DriverState::Ready]);

        critical_section(|_| {
            self.state = DriverState::ActiveRx;
            self.lld.start_receive();
        });
    }

    /// Fetch the next received word (thread context, may block)
    pub fn receive(&mut self, timeout: OsTick) -> OsResult<OsMsg> {
        os_dbg_check_thread!();
        self.state.require(&[
            DriverState::Ready,
            DriverState::ActiveTx,
            DriverState::ActiveRx,
        ]);

        self.rx_mbox.fetch(timeout)
    }

    /// ISR trampoline: transmission complete
    ///
    /// The ISR wrapper holds the lock (`os_sys_lock_from_isr`).
    pub fn on_transmit_complete_i(&mut self) {
        os_dbg_check_locked!();
        self.state.require(&[DriverState::ActiveTx]);

        self.state = DriverState::Ready;
    }

    /// ISR trampoline: a word arrived
    ///
    /// Posts into the rx mailbox without blocking; a full mailbox raises
    /// the overrun flag and drops the word.
    pub fn on_receive_i(&mut self, msg: OsMsg) {
        os_dbg_check_locked!();

        if self.rx_mbox.post_i(msg).is_err() {
            self.errors |= errflags::OVERRUN;
        }
    }

    /// ISR trampoline: reception stopped by the hardware
    pub fn on_receive_complete_i(&mut self) {
        os_dbg_check_locked!();
        self.state.require(&[DriverState::ActiveRx]);

        self.state = DriverState::Ready;
    }

    /// ISR trampoline: hardware error report
    pub fn on_error_i(&mut self, flags: u32) {
        os_dbg_check_locked!();

        self.errors |= flags;
    }

    /// Return and clear the accumulated error flags
    pub fn get_and_clear_errors(&mut self) -> u32 {
        critical_section(|_| {
            let flags = self.errors;
            self.errors = 0;
            flags
        })
    }

    /// Stored configuration, if started
    #[inline]
    pub fn config(&self) -> Option<&L::Config> {
        self.config.as_ref()
    }

    /// Access the low-level half
    #[inline]
    pub fn lld(&self) -> &L {
        &self.lld
    }

    /// Access the low-level half mutably
    ///
    /// For completion handlers that must consume hardware state before
    /// calling the `_i` trampolines; take the lock first.
    #[inline]
    pub fn lld_mut(&mut self) -> &mut L {
        &mut self.lld
    }
}
