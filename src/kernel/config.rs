//! Compile-time configuration for the kernel
//!
//! These constants control timing behavior of the kernel.

/// System tick rate in Hz
pub const CFG_TICK_RATE_HZ: u32 = 1000;

/// Core clock in Hz, used to derive the SysTick reload value
pub const CFG_CORE_CLK_HZ: u32 = 16_000_000;

/// SysTick reload value for one kernel tick
pub const CFG_SYSTICK_RELOAD: u32 = CFG_CORE_CLK_HZ / CFG_TICK_RATE_HZ;
