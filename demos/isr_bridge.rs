//! Driver pattern demo: ISR-to-thread handoff through a mailbox
//!
//! A loopback low-level driver raises PendSV as its "completion
//! interrupt": every transmitted word comes back through the receive
//! mailbox, exactly the way a real peripheral driver bridges interrupt
//! completion events to a waiting thread.

#![cfg_attr(target_arch = "arm", no_std)]
#![cfg_attr(target_arch = "arm", no_main)]
#![allow(static_mut_refs)]

#[cfg(target_arch = "arm")]
mod demo {
    use cortex_m::peripheral::SCB;
    use cortex_m_rt::{entry, exception};
    use defmt::info;

    use rtmbox::config::CFG_SYSTICK_RELOAD;
    use rtmbox::critical::{os_sys_lock_from_isr, os_sys_unlock_from_isr};
    use rtmbox::driver::{ComDriver, ComLld};
    use rtmbox::kernel::cs_cell::CsCell;
    use rtmbox::mailbox::Mailbox;
    use rtmbox::port;
    use rtmbox::time::os_time_dly;
    use rtmbox::types::{OsMsg, TIMEOUT_INFINITE};
    use rtmbox::{os_init, os_int_enter, os_int_exit};

    static RX_MBOX: Mailbox = Mailbox::new();
    static mut RX_BUF: [OsMsg; 8] = [0; 8];

    /// Loopback "hardware": transmit latches the word and pends PendSV.
    struct LoopbackLld {
        pending: Option<OsMsg>,
    }

    struct LoopbackConfig;

    impl ComLld for LoopbackLld {
        type Config = LoopbackConfig;

        fn start(&mut self, _config: &LoopbackConfig) {}

        fn stop(&mut self) {
            self.pending = None;
        }

        fn transmit(&mut self, msg: OsMsg) {
            self.pending = Some(msg);
            SCB::set_pendsv();
        }

        fn start_receive(&mut self) {}
    }

    static DRIVER: CsCell<ComDriver<LoopbackLld>> =
        CsCell::new(ComDriver::new(LoopbackLld { pending: None }, &RX_MBOX));

    #[exception]
    fn PendSV() {
        os_int_enter();
        os_sys_lock_from_isr();

        let drv = unsafe { DRIVER.get_unchecked() };
        if let Some(msg) = drv.lld_mut().pending.take() {
            drv.on_transmit_complete_i();
            drv.on_receive_i(msg);
        }

        os_sys_unlock_from_isr();
        os_int_exit();
    }

    #[entry]
    fn main() -> ! {
        os_init();
        RX_MBOX.create(unsafe { &mut RX_BUF });
        port::os_systick_init(CFG_SYSTICK_RELOAD);

        info!("ISR bridge demo");

        let drv = unsafe { DRIVER.get_unchecked() };
        drv.start(LoopbackConfig);

        let mut n: OsMsg = 0;
        loop {
            n = n.wrapping_add(1);
            drv.transmit(n);

            if let Ok(msg) = drv.receive(TIMEOUT_INFINITE) {
                info!("echoed {}", msg);
            }

            let errors = drv.get_and_clear_errors();
            if errors != 0 {
                info!("driver errors: {}", errors);
            }

            os_time_dly(500);
        }
    }
}

// The demo only runs on the target.
#[cfg(not(target_arch = "arm"))]
fn main() {}
