//! Cortex-M port
//!
//! Parked threads sleep on WFE; wakers issue SEV. Any interrupt also ends
//! a WFE, so a parked thread re-evaluates its wait condition after every
//! ISR.

use cortex_m::peripheral::syst::SystClkSource;

/// Wait for an event or interrupt.
#[inline]
pub fn os_idle_wait() {
    cortex_m::asm::wfe();
}

/// Signal all cores/threads waiting for an event.
#[inline]
pub fn os_event_signal() {
    cortex_m::asm::sev();
}

/// Configure and start the SysTick timer as the kernel tick source.
///
/// `reload` is the number of core clock cycles per tick, typically
/// [`CFG_SYSTICK_RELOAD`](crate::config::CFG_SYSTICK_RELOAD).
pub fn os_systick_init(reload: u32) {
    if let Some(mut p) = cortex_m::Peripherals::take() {
        p.SYST.set_clock_source(SystClkSource::Core);
        p.SYST.set_reload(reload - 1);
        p.SYST.clear_current();
        p.SYST.enable_interrupt();
        p.SYST.enable_counter();
    }
}
