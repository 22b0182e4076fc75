//! RTOS message-passing core in Rust
//!
//! A real-time kernel nucleus providing:
//! - The system lock discipline (critical sections, ISR-safe variants)
//! - Counting semaphores with timeout-bounded FIFO waits
//! - Mailboxes: bounded message queues with blocking and I-class entry
//!   points, urgent (ahead) insertion and a reset/resume protocol
//! - The driver synchronization state machine every peripheral driver
//!   follows to bridge interrupt completion events to thread context

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]

// ============ Critical Section ============

#[cfg(target_arch = "arm")]
mod cs_impl {
    use cortex_m::interrupt;
    use cortex_m::register::primask;
    use critical_section::{set_impl, Impl, RawRestoreState};

    struct SingleCoreCriticalSection;
    set_impl!(SingleCoreCriticalSection);

    unsafe impl Impl for SingleCoreCriticalSection {
        unsafe fn acquire() -> RawRestoreState {
            let was_active = primask::read().is_active();
            interrupt::disable();
            was_active
        }

        unsafe fn release(was_active: RawRestoreState) {
            if was_active {
                unsafe { interrupt::enable() }
            }
        }
    }
}

// ============ Modules ============

pub mod log;
mod lang_items;

pub mod kernel;
pub mod port;
pub mod sync;

#[cfg(feature = "driver")]
pub mod driver;

// ============ Re-exports ============

pub use crate::kernel::config;
pub use crate::kernel::config::*;
pub use crate::kernel::critical;
pub use crate::kernel::error;
pub use crate::kernel::error::{OsError, OsResult};
pub use crate::kernel::state;
pub use crate::kernel::state::{os_init, os_int_enter, os_int_exit};
pub use crate::kernel::time;
pub use crate::kernel::types;
pub use crate::kernel::types::*;

#[cfg(feature = "sem")]
pub use crate::sync::sem;
#[cfg(feature = "mailbox")]
pub use crate::sync::mailbox;
