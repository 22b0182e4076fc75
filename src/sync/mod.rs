//! Synchronization primitives
//!
//! Contains the wait queue, counting semaphores and mailboxes.

pub mod queue;

#[cfg(feature = "sem")]
pub mod sem;

#[cfg(feature = "mailbox")]
pub mod mailbox;
