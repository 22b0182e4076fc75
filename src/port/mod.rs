//! Port layer — CPU-specific services the kernel consumes
//!
//! The synchronization core needs exactly three things from the platform:
//! an idle-wait primitive used while a thread is parked on a wait queue, an
//! event signal that ends such a wait, and a way to start the tick source.
//! Context switching proper belongs to an external scheduler; the wait
//! queue/wake-status protocol in `sync` is the integration seam.

#[cfg(target_arch = "arm")]
pub mod cortex_m;

#[cfg(target_arch = "arm")]
pub use self::cortex_m::*;

/// Simulation port for non-ARM targets (host unit tests).
///
/// Every idle-wait poll advances the kernel tick by one, so bounded waits
/// expire deterministically on a single test thread.
#[cfg(not(target_arch = "arm"))]
pub mod sim {
    use crate::kernel::state::KERNEL;

    /// Wait for something to happen; one simulated tick passes.
    #[inline]
    pub fn os_idle_wait() {
        KERNEL.tick_increment();
        core::hint::spin_loop();
    }

    /// Signal parked threads that state changed. No-op in simulation.
    #[inline]
    pub fn os_event_signal() {}

    /// No tick interrupt to configure in simulation.
    pub fn os_systick_init(_reload: u32) {}
}

#[cfg(not(target_arch = "arm"))]
pub use sim::*;
