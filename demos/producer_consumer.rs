//! Producer-consumer over a mailbox
//!
//! Single-flow demo of the mailbox API: batch-produce, jump the queue
//! with an urgent message, drain, repeat.

#![cfg_attr(target_arch = "arm", no_std)]
#![cfg_attr(target_arch = "arm", no_main)]
#![allow(static_mut_refs)]

#[cfg(target_arch = "arm")]
mod demo {
    use cortex_m_rt::entry;
    use defmt::info;

    use rtmbox::config::CFG_SYSTICK_RELOAD;
    use rtmbox::mailbox::Mailbox;
    use rtmbox::os_init;
    use rtmbox::port;
    use rtmbox::time::os_time_dly;
    use rtmbox::types::{OsMsg, TIMEOUT_IMMEDIATE};

    const URGENT: OsMsg = OsMsg::MAX;

    static MBOX: Mailbox = Mailbox::new();
    static mut MBOX_BUF: [OsMsg; 4] = [0; 4];

    #[entry]
    fn main() -> ! {
        os_init();
        MBOX.create(unsafe { &mut MBOX_BUF });
        port::os_systick_init(CFG_SYSTICK_RELOAD);

        info!("Mailbox producer-consumer demo");

        let mut seq: OsMsg = 0;
        loop {
            // Produce a batch, leaving one slot free.
            for _ in 0..3 {
                if MBOX.post(seq, TIMEOUT_IMMEDIATE).is_ok() {
                    seq = seq.wrapping_add(1);
                }
            }

            // An urgent message takes the last slot and is fetched first.
            let _ = MBOX.post_ahead(URGENT, TIMEOUT_IMMEDIATE);
            info!(
                "queued: {} used / {} free",
                MBOX.used_count(),
                MBOX.free_count()
            );

            while let Ok(msg) = MBOX.fetch(TIMEOUT_IMMEDIATE) {
                if msg == URGENT {
                    info!("consumed URGENT");
                } else {
                    info!("consumed {}", msg);
                }
            }

            os_time_dly(1000);
        }
    }
}

// The demo only runs on the target.
#[cfg(not(target_arch = "arm"))]
fn main() {}
