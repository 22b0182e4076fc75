//! Time management
//!
//! Tick source, deadline arithmetic and delays. The tick counter is
//! advanced by the SysTick handler on the target; the host port simulates
//! it (see `port`).

use crate::config::CFG_TICK_RATE_HZ;
use crate::kernel::state::{os_int_enter, os_int_exit, KERNEL};
use crate::port;
use crate::types::OsTick;
use crate::{os_dbg_assert, os_dbg_check_thread};

/// Get the current tick count
#[inline]
pub fn os_tick_now() -> OsTick {
    KERNEL.tick_get()
}

/// Ticks elapsed since `since`, wrap-safe
#[inline]
pub fn os_tick_elapsed(since: OsTick) -> OsTick {
    os_tick_now().wrapping_sub(since)
}

/// Convert milliseconds to ticks, rounding down
#[inline]
pub const fn os_ms_to_ticks(ms: u32) -> OsTick {
    ((ms as u64 * CFG_TICK_RATE_HZ as u64) / 1000) as OsTick
}

/// Delay the caller for the given number of ticks
///
/// Thread context only. The caller idles on the port's wait-for-event
/// primitive until the deadline passes.
pub fn os_time_dly(ticks: OsTick) {
    os_dbg_check_thread!();
    os_dbg_assert!(
        KERNEL.is_initialized(),
        "delay requested before kernel init"
    );

    let start = os_tick_now();
    while os_tick_elapsed(start) < ticks {
        port::os_idle_wait();
    }
}

/// Tick handler
///
/// Advances the kernel tick counter. Call from the tick interrupt.
pub fn os_tick_handler() {
    KERNEL.tick_increment();
}

/// SysTick interrupt handler
#[no_mangle]
pub extern "C" fn SysTick() {
    os_int_enter();
    os_tick_handler();
    os_int_exit();
}
