//! Unit tests for the message-passing core
//!
//! These tests run on the host (not an embedded target). The host port
//! simulates the tick source: every parked poll advances the kernel tick
//! by one, so bounded waits expire deterministically on a single thread.

#[cfg(test)]
mod sem_tests {
    use rtmbox::sem::{OsSem, Semaphore};
    use rtmbox::types::TIMEOUT_IMMEDIATE;
    use rtmbox::OsError;

    #[test]
    fn counts_are_consumed_and_replenished() {
        let mut sem = OsSem::new(3);
        assert_eq!(sem.counter(), 3);

        assert_eq!(sem.wait(TIMEOUT_IMMEDIATE), Ok(()));
        assert_eq!(sem.wait(TIMEOUT_IMMEDIATE), Ok(()));
        assert_eq!(sem.counter(), 1);

        sem.signal();
        assert_eq!(sem.counter(), 2);
    }

    #[test]
    fn empty_semaphore_probe_times_out() {
        let mut sem = OsSem::new(0);
        assert_eq!(sem.wait(TIMEOUT_IMMEDIATE), Err(OsError::Timeout));
    }

    #[test]
    fn bounded_wait_times_out() {
        let mut sem = OsSem::new(0);
        assert_eq!(sem.wait(10), Err(OsError::Timeout));
        // The failed wait must not disturb the counter.
        assert_eq!(sem.counter(), 0);
    }

    #[test]
    fn signal_beyond_initial_count_is_allowed() {
        let mut sem = OsSem::new(1);
        sem.signal();
        sem.signal();
        assert_eq!(sem.counter(), 3);
    }

    #[test]
    fn reset_forces_counter() {
        let mut sem = OsSem::new(5);
        sem.reset(0);
        assert_eq!(sem.counter(), 0);
        sem.reset(2);
        assert_eq!(sem.counter(), 2);
    }

    #[test]
    fn static_wrapper_round_trip() {
        static SEM: Semaphore = Semaphore::new(1);
        assert_eq!(SEM.wait(TIMEOUT_IMMEDIATE), Ok(()));
        assert_eq!(SEM.wait(TIMEOUT_IMMEDIATE), Err(OsError::Timeout));
        SEM.signal();
        assert_eq!(SEM.wait(TIMEOUT_IMMEDIATE), Ok(()));
    }
}

#[cfg(test)]
mod mailbox_tests {
    use rtmbox::critical::critical_section;
    use rtmbox::mailbox::{Mailbox, OsMailbox};
    use rtmbox::types::{OsMsg, TIMEOUT_IMMEDIATE};
    use rtmbox::OsError;

    fn make_mailbox(buf: &mut [OsMsg]) -> OsMailbox {
        let mut mb = OsMailbox::new();
        unsafe { mb.init(buf.as_mut_ptr(), buf.len()) };
        mb
    }

    #[test]
    fn messages_come_out_in_post_order() {
        let mut buf = [0 as OsMsg; 4];
        let mut mb = make_mailbox(&mut buf);

        assert_eq!(mb.post('A' as OsMsg, TIMEOUT_IMMEDIATE), Ok(()));
        assert_eq!(mb.post('B' as OsMsg, TIMEOUT_IMMEDIATE), Ok(()));
        assert_eq!(mb.post('C' as OsMsg, TIMEOUT_IMMEDIATE), Ok(()));

        assert_eq!(mb.fetch(TIMEOUT_IMMEDIATE), Ok('A' as OsMsg));
        assert_eq!(mb.fetch(TIMEOUT_IMMEDIATE), Ok('B' as OsMsg));
        assert_eq!(mb.fetch(TIMEOUT_IMMEDIATE), Ok('C' as OsMsg));
    }

    #[test]
    fn ahead_post_jumps_the_queue() {
        let mut buf = [0 as OsMsg; 4];
        let mut mb = make_mailbox(&mut buf);

        // Mailbox holds [B, C, D] in read-to-write order.
        assert_eq!(mb.post('B' as OsMsg, TIMEOUT_IMMEDIATE), Ok(()));
        assert_eq!(mb.post('C' as OsMsg, TIMEOUT_IMMEDIATE), Ok(()));
        assert_eq!(mb.post('D' as OsMsg, TIMEOUT_IMMEDIATE), Ok(()));

        assert_eq!(mb.post_ahead('A' as OsMsg, TIMEOUT_IMMEDIATE), Ok(()));

        assert_eq!(mb.fetch(TIMEOUT_IMMEDIATE), Ok('A' as OsMsg));
        assert_eq!(mb.fetch(TIMEOUT_IMMEDIATE), Ok('B' as OsMsg));
        assert_eq!(mb.fetch(TIMEOUT_IMMEDIATE), Ok('C' as OsMsg));
    }

    #[test]
    fn free_plus_used_equals_capacity_at_every_step() {
        let mut buf = [0 as OsMsg; 4];
        let mut mb = make_mailbox(&mut buf);

        let check = |mb: &OsMailbox| {
            assert_eq!(mb.free_count() + mb.used_count(), 4);
        };

        check(&mb);
        for i in 0..4 {
            assert_eq!(mb.post(i, TIMEOUT_IMMEDIATE), Ok(()));
            check(&mb);
        }
        for _ in 0..3 {
            mb.fetch(TIMEOUT_IMMEDIATE).unwrap();
            check(&mb);
        }
        assert_eq!(mb.post_ahead(9, TIMEOUT_IMMEDIATE), Ok(()));
        check(&mb);
    }

    #[test]
    fn mailbox_scenario_abcd() {
        let mut buf = [0 as OsMsg; 4];
        let mut mb = make_mailbox(&mut buf);
        mb.reset();
        mb.resume();

        assert_eq!(mb.post('B' as OsMsg, TIMEOUT_IMMEDIATE), Ok(()));
        assert_eq!(mb.post('C' as OsMsg, TIMEOUT_IMMEDIATE), Ok(()));
        assert_eq!(mb.post('D' as OsMsg, TIMEOUT_IMMEDIATE), Ok(()));
        assert_eq!(mb.post_ahead('A' as OsMsg, TIMEOUT_IMMEDIATE), Ok(()));

        assert_eq!(mb.free_count(), 0);
        assert_eq!(mb.used_count(), 4);

        let mut out = String::new();
        for _ in 0..4 {
            let msg = mb.fetch(TIMEOUT_IMMEDIATE).unwrap();
            out.push(msg as u8 as char);
        }
        assert_eq!(out, "ABCD");

        assert_eq!(mb.free_count(), 4);
        assert_eq!(mb.used_count(), 0);
    }

    #[test]
    fn full_mailbox_rejects_posts() {
        let mut buf = [0 as OsMsg; 2];
        let mut mb = make_mailbox(&mut buf);

        assert_eq!(mb.post(1, TIMEOUT_IMMEDIATE), Ok(()));
        assert_eq!(mb.post(2, TIMEOUT_IMMEDIATE), Ok(()));

        // Non-blocking probe.
        assert_eq!(mb.post(3, TIMEOUT_IMMEDIATE), Err(OsError::Timeout));
        // Bounded wait, expires on the simulated tick.
        assert_eq!(mb.post(3, 3), Err(OsError::Timeout));
        // I-class attempt.
        critical_section(|_| {
            assert_eq!(mb.post_i(3), Err(OsError::Timeout));
            assert_eq!(mb.post_ahead_i(3), Err(OsError::Timeout));
        });

        // Nothing was disturbed.
        assert_eq!(mb.used_count(), 2);
        assert_eq!(mb.fetch(TIMEOUT_IMMEDIATE), Ok(1));
    }

    #[test]
    fn empty_mailbox_rejects_fetches() {
        let mut buf = [0 as OsMsg; 2];
        let mut mb = make_mailbox(&mut buf);

        assert_eq!(mb.fetch(TIMEOUT_IMMEDIATE), Err(OsError::Timeout));
        assert_eq!(mb.fetch(3), Err(OsError::Timeout));
        critical_section(|_| {
            assert_eq!(mb.fetch_i(), Err(OsError::Timeout));
        });
        assert_eq!(mb.free_count(), 2);
    }

    #[test]
    fn reset_then_resume_round_trips() {
        let mut buf = [0 as OsMsg; 4];
        let mut mb = make_mailbox(&mut buf);

        assert_eq!(mb.post(11, TIMEOUT_IMMEDIATE), Ok(()));
        assert_eq!(mb.post(22, TIMEOUT_IMMEDIATE), Ok(()));

        mb.reset();
        assert_eq!(mb.post(33, TIMEOUT_IMMEDIATE), Err(OsError::Reset));
        assert_eq!(mb.fetch(TIMEOUT_IMMEDIATE), Err(OsError::Reset));

        mb.resume();
        assert_eq!(mb.free_count(), 4);
        assert_eq!(mb.used_count(), 0);

        assert_eq!(mb.post(44, TIMEOUT_IMMEDIATE), Ok(()));
        assert_eq!(mb.fetch(TIMEOUT_IMMEDIATE), Ok(44));
    }

    #[test]
    fn wraparound_preserves_fifo_order() {
        let mut buf = [0 as OsMsg; 3];
        let mut mb = make_mailbox(&mut buf);

        // Drive the indices around the ring a few times.
        for round in 0..5 {
            for i in 0..3 {
                assert_eq!(mb.post(round * 10 + i, TIMEOUT_IMMEDIATE), Ok(()));
            }
            for i in 0..3 {
                assert_eq!(mb.fetch(TIMEOUT_IMMEDIATE), Ok(round * 10 + i));
            }
        }
    }

    #[test]
    fn static_wrapper_with_static_buffer() {
        static MB: Mailbox = Mailbox::new();
        MB.create(Box::leak(Box::new([0 as OsMsg; 4])));

        assert_eq!(MB.post(5, TIMEOUT_IMMEDIATE), Ok(()));
        critical_section(|_| {
            assert_eq!(MB.peek_i(), Ok(5));
            assert_eq!(MB.post_i(6), Ok(()));
        });
        assert_eq!(MB.fetch(TIMEOUT_IMMEDIATE), Ok(5));
        assert_eq!(MB.fetch(TIMEOUT_IMMEDIATE), Ok(6));
        assert_eq!(MB.size(), 4);
    }
}

#[cfg(test)]
mod driver_tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use rtmbox::critical::critical_section;
    use rtmbox::driver::com::errflags;
    use rtmbox::driver::{ComDriver, ComLld, DriverState};
    use rtmbox::mailbox::Mailbox;
    use rtmbox::types::{OsMsg, TIMEOUT_IMMEDIATE};
    use rtmbox::OsError;

    #[derive(Default)]
    struct MockState {
        starts: u32,
        stops: u32,
        transmitted: Vec<OsMsg>,
        receiving: bool,
    }

    struct MockLld {
        state: Rc<RefCell<MockState>>,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct MockConfig {
        baud: u32,
    }

    impl ComLld for MockLld {
        type Config = MockConfig;

        fn start(&mut self, _config: &MockConfig) {
            self.state.borrow_mut().starts += 1;
        }

        fn stop(&mut self) {
            self.state.borrow_mut().stops += 1;
        }

        fn transmit(&mut self, msg: OsMsg) {
            self.state.borrow_mut().transmitted.push(msg);
        }

        fn start_receive(&mut self) {
            self.state.borrow_mut().receiving = true;
        }
    }

    fn make_driver(mbox: &'static Mailbox) -> (ComDriver<MockLld>, Rc<RefCell<MockState>>) {
        mbox.create(Box::leak(Box::new([0 as OsMsg; 2])));
        let state = Rc::new(RefCell::new(MockState::default()));
        let lld = MockLld {
            state: Rc::clone(&state),
        };
        (ComDriver::new(lld, mbox), state)
    }

    #[test]
    fn start_configures_and_transitions_to_ready() {
        static RX: Mailbox = Mailbox::new();
        let (mut drv, state) = make_driver(&RX);

        assert_eq!(drv.state(), DriverState::Stop);
        assert!(drv.config().is_none());

        drv.start(MockConfig { baud: 115_200 });
        assert_eq!(drv.state(), DriverState::Ready);
        assert_eq!(drv.config(), Some(&MockConfig { baud: 115_200 }));
        assert_eq!(state.borrow().starts, 1);

        // Reconfiguring from Ready is allowed and hits the hardware again.
        drv.start(MockConfig { baud: 9600 });
        assert_eq!(state.borrow().starts, 2);
        assert_eq!(drv.config(), Some(&MockConfig { baud: 9600 }));

        drv.stop();
        assert_eq!(drv.state(), DriverState::Stop);
        assert!(drv.config().is_none());
        assert_eq!(state.borrow().stops, 1);
    }

    #[test]
    fn transmit_completes_through_isr_trampoline() {
        static RX: Mailbox = Mailbox::new();
        let (mut drv, state) = make_driver(&RX);
        drv.start(MockConfig { baud: 115_200 });

        drv.transmit(0x55);
        assert_eq!(drv.state(), DriverState::ActiveTx);
        assert_eq!(state.borrow().transmitted, vec![0x55]);

        critical_section(|_| drv.on_transmit_complete_i());
        assert_eq!(drv.state(), DriverState::Ready);
    }

    #[test]
    fn received_words_reach_thread_context() {
        static RX: Mailbox = Mailbox::new();
        let (mut drv, state) = make_driver(&RX);
        drv.start(MockConfig { baud: 115_200 });

        drv.start_receive();
        assert_eq!(drv.state(), DriverState::ActiveRx);
        assert!(state.borrow().receiving);

        critical_section(|_| {
            drv.on_receive_i(0x11);
            drv.on_receive_i(0x22);
        });

        assert_eq!(drv.receive(TIMEOUT_IMMEDIATE), Ok(0x11));
        assert_eq!(drv.receive(TIMEOUT_IMMEDIATE), Ok(0x22));
        assert_eq!(drv.receive(TIMEOUT_IMMEDIATE), Err(OsError::Timeout));

        critical_section(|_| drv.on_receive_complete_i());
        assert_eq!(drv.state(), DriverState::Ready);
    }

    #[test]
    fn overrun_sets_error_flag_instead_of_blocking() {
        static RX: Mailbox = Mailbox::new();
        let (mut drv, _state) = make_driver(&RX);
        drv.start(MockConfig { baud: 115_200 });
        drv.start_receive();

        critical_section(|_| {
            // Mailbox capacity is 2; the third word must be dropped.
            drv.on_receive_i(1);
            drv.on_receive_i(2);
            drv.on_receive_i(3);
        });

        assert_eq!(drv.get_and_clear_errors(), errflags::OVERRUN);
        assert_eq!(drv.get_and_clear_errors(), 0);

        // The first two words survived.
        assert_eq!(drv.receive(TIMEOUT_IMMEDIATE), Ok(1));
        assert_eq!(drv.receive(TIMEOUT_IMMEDIATE), Ok(2));
    }

    #[test]
    fn hardware_errors_accumulate() {
        static RX: Mailbox = Mailbox::new();
        let (mut drv, _state) = make_driver(&RX);
        drv.start(MockConfig { baud: 115_200 });

        critical_section(|_| {
            drv.on_error_i(errflags::FRAMING);
            drv.on_error_i(errflags::NOISE);
        });
        assert_eq!(
            drv.get_and_clear_errors(),
            errflags::FRAMING | errflags::NOISE
        );
    }
}

#[cfg(test)]
mod cs_cell_tests {
    use rtmbox::critical::critical_section;
    use rtmbox::kernel::cs_cell::CsCell;

    #[test]
    fn cell_is_accessible_inside_the_section() {
        static CELL: CsCell<u32> = CsCell::new(7);
        critical_section(|cs| {
            *CELL.get(cs) += 1;
            assert_eq!(*CELL.get(cs), 8);
        });
    }
}

#[cfg(test)]
mod time_tests {
    use rtmbox::time::{os_tick_elapsed, os_tick_now, os_time_dly};

    #[test]
    fn delay_returns_after_ticks_pass() {
        rtmbox::os_init();
        let start = os_tick_now();
        os_time_dly(10);
        assert!(os_tick_elapsed(start) >= 10);
    }
}

#[cfg(test)]
mod error_tests {
    use rtmbox::OsError;

    #[test]
    fn error_variants_compare() {
        assert_eq!(OsError::Timeout, OsError::Timeout);
        assert_ne!(OsError::Timeout, OsError::Reset);
    }

    #[test]
    fn errors_format_for_debugging() {
        let err = OsError::Reset;
        let _ = format!("{:?}", err);
    }
}

#[cfg(test)]
mod types_tests {
    use rtmbox::types::*;

    #[test]
    fn timeout_constants_are_distinct() {
        assert_eq!(TIMEOUT_IMMEDIATE, 0);
        assert_eq!(TIMEOUT_INFINITE, OsTick::MAX);
        assert_ne!(TIMEOUT_IMMEDIATE, TIMEOUT_INFINITE);
    }

    #[test]
    fn pend_status_enum() {
        let status = OsPendStatus::Ok;
        assert_eq!(status, OsPendStatus::Ok);
        assert_ne!(status, OsPendStatus::Reset);
        assert_ne!(OsPendStatus::Pending, OsPendStatus::Ok);
    }
}

#[cfg(test)]
mod config_tests {
    use rtmbox::config::*;
    use rtmbox::time::os_ms_to_ticks;

    #[test]
    fn config_values() {
        assert!(CFG_TICK_RATE_HZ >= 10, "Tick rate too slow");
        assert!(CFG_TICK_RATE_HZ <= 10000, "Tick rate too fast");
        assert_eq!(CFG_SYSTICK_RELOAD, CFG_CORE_CLK_HZ / CFG_TICK_RATE_HZ);
    }

    #[test]
    fn ms_conversion_uses_tick_rate() {
        assert_eq!(os_ms_to_ticks(0), 0);
        assert_eq!(os_ms_to_ticks(1000), CFG_TICK_RATE_HZ);
    }
}
