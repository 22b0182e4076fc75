//! Debug assertion macros
//!
//! Precondition violations are programmer errors, not runtime errors: they
//! halt in debug builds and compile out entirely in release builds. They are
//! never part of the `OsResult` status channel.

/// Assert a kernel invariant or API precondition.
#[macro_export]
macro_rules! os_dbg_assert {
    ($cond:expr, $msg:expr) => {
        debug_assert!($cond, $msg)
    };
}

/// Assert that the caller holds the system critical section.
///
/// Every I-class and S-class entry point starts with this check.
#[macro_export]
macro_rules! os_dbg_check_locked {
    () => {
        debug_assert!(
            $crate::critical::CriticalSection::is_active(),
            "I/S-class call without the system locked"
        )
    };
}

/// Assert that the caller runs in thread context, not in an ISR.
///
/// Blocking entry points start with this check: an ISR must never suspend.
#[macro_export]
macro_rules! os_dbg_check_thread {
    () => {
        debug_assert!(
            !$crate::critical::is_isr_context(),
            "thread-class call from ISR context"
        )
    };
}
