use std::{
    collections::VecDeque,
    net::Ipv4Addr,
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use parking_lot::Mutex;

use super::{ConnectionController, Outcome, Phase};
use crate::{
    config::StationConfig,
    error::{StackError, StationError},
    notification::Notification,
    stack::StationStack,
};

#[derive(Default)]
struct ScriptedStack {
    calls: AtomicU32,
    rejections: Mutex<VecDeque<StackError>>,
}

impl ScriptedStack {
    fn rejecting(count: usize) -> Self {
        let stack = Self::default();
        stack
            .rejections
            .lock()
            .extend((0..count).map(|_| StackError::Driver { code: 0x3007 }));
        stack
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl StationStack for ScriptedStack {
    fn begin_attempt(&self) -> Result<(), StackError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.rejections.lock().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn controller_with(stack: ScriptedStack, max_retries: u32) -> (Arc<ScriptedStack>, ConnectionController) {
    let stack = Arc::new(stack);
    let config = StationConfig::new("lab-ap", "hunter22", max_retries).unwrap();
    let controller = ConnectionController::new(config, stack.clone());
    (stack, controller)
}

fn controller(max_retries: u32) -> (Arc<ScriptedStack>, ConnectionController) {
    controller_with(ScriptedStack::default(), max_retries)
}

fn lost() -> Notification {
    Notification::LinkLost { reason: 201 }
}

fn got_ip(address: Ipv4Addr) -> Notification {
    Notification::AddressAcquired(address)
}

#[test]
fn scenario_exhausts_three_retries() {
    let (stack, controller) = controller(3);
    controller.handle_notification(Notification::AttemptStartable);
    for _ in 0..4 {
        controller.handle_notification(lost());
    }

    let snapshot = controller.snapshot();
    assert!(matches!(snapshot.phase, Phase::Failed));
    assert_eq!(snapshot.retry_count, 3);
    assert_eq!(stack.calls(), 4);
    assert_eq!(controller.outcome(), Some(Outcome::Failed));
}

#[test]
fn scenario_connects_after_one_loss() {
    let address = Ipv4Addr::new(192, 0, 2, 5);
    let (_stack, controller) = controller(3);
    controller.handle_notification(Notification::AttemptStartable);
    controller.handle_notification(lost());
    controller.handle_notification(got_ip(address));

    let snapshot = controller.snapshot();
    assert!(matches!(snapshot.phase, Phase::Connected));
    assert_eq!(snapshot.retry_count, 0);
    assert_eq!(snapshot.address, Some(address));
    assert_eq!(
        controller.await_outcome(Duration::ZERO),
        Ok(Outcome::Connected(address))
    );
}

#[test]
fn scenario_second_start_is_rejected() {
    let (stack, controller) = controller(3);
    assert_eq!(controller.start(), Ok(()));
    let before = controller.snapshot();

    assert_eq!(
        controller.start(),
        Err(StationError::AlreadyStarted(Phase::Connecting))
    );
    assert_eq!(controller.snapshot(), before);
    assert_eq!(stack.calls(), 1);
    assert_eq!(controller.outcome(), None);
}

#[test]
fn scenario_zero_timeout_while_connecting() {
    let (_stack, controller) = controller(3);
    controller.start().unwrap();
    assert_eq!(
        controller.await_outcome(Duration::ZERO),
        Err(StationError::Timeout(Duration::ZERO))
    );
    assert!(matches!(controller.current_phase(), Phase::Connecting));
}

#[test]
fn n_plus_one_losses_always_fail() {
    for max_retries in 0..=6 {
        let (stack, controller) = controller(max_retries);
        controller.start().unwrap();
        for _ in 0..max_retries {
            controller.handle_notification(lost());
            assert!(matches!(controller.current_phase(), Phase::Connecting));
        }
        controller.handle_notification(lost());

        let signal = controller.signal();
        assert!(matches!(controller.current_phase(), Phase::Failed));
        assert!(signal.is_failed());
        assert!(!signal.is_connected());
        assert_eq!(controller.snapshot().retry_count, max_retries);
        assert_eq!(stack.calls(), max_retries + 1);
    }
}

#[test]
fn up_to_n_losses_then_address_connects() {
    let address = Ipv4Addr::new(192, 0, 2, 77);
    for max_retries in 0..=5 {
        for losses in 0..=max_retries {
            let (stack, controller) = controller(max_retries);
            controller.start().unwrap();
            for _ in 0..losses {
                controller.handle_notification(lost());
            }
            controller.handle_notification(got_ip(address));

            let snapshot = controller.snapshot();
            let signal = controller.signal();
            assert!(matches!(snapshot.phase, Phase::Connected));
            assert_eq!(snapshot.retry_count, 0);
            assert!(signal.is_connected());
            assert!(!signal.is_failed());
            // Already latched, so a second set is refused.
            assert!(!signal.set_connected(Ipv4Addr::new(10, 9, 9, 9)));
            assert_eq!(controller.outcome(), Some(Outcome::Connected(address)));
            assert_eq!(stack.calls(), losses + 1);
        }
    }
}

#[test]
fn failed_absorbs_every_notification() {
    let (stack, controller) = controller(1);
    controller.start().unwrap();
    controller.handle_notification(lost());
    controller.handle_notification(lost());
    let settled = controller.snapshot();
    let calls = stack.calls();

    for notification in [
        Notification::AttemptStartable,
        lost(),
        got_ip(Ipv4Addr::new(192, 0, 2, 1)),
    ] {
        controller.handle_notification(notification);
        assert_eq!(controller.snapshot(), settled);
        assert_eq!(controller.outcome(), Some(Outcome::Failed));
        assert!(!controller.signal().is_connected());
    }
    assert_eq!(stack.calls(), calls);
}

#[test]
fn connected_absorbs_startable_and_repeat_address() {
    let address = Ipv4Addr::new(192, 0, 2, 5);
    let (stack, controller) = controller(2);
    controller.start().unwrap();
    controller.handle_notification(got_ip(address));
    let settled = controller.snapshot();

    controller.handle_notification(Notification::AttemptStartable);
    controller.handle_notification(got_ip(Ipv4Addr::new(192, 0, 2, 9)));
    assert_eq!(controller.snapshot(), settled);
    assert_eq!(controller.outcome(), Some(Outcome::Connected(address)));
    assert_eq!(stack.calls(), 1);
}

#[test]
fn repeated_waits_return_same_outcome() {
    let address = Ipv4Addr::new(192, 0, 2, 5);
    let (_stack, controller) = controller(0);
    controller.start().unwrap();
    controller.handle_notification(got_ip(address));

    for _ in 0..3 {
        assert_eq!(
            controller.await_outcome(Duration::from_millis(5)),
            Ok(Outcome::Connected(address))
        );
    }
    assert_eq!(controller.wait_outcome(), Outcome::Connected(address));
}

#[test]
fn post_success_retries_use_same_bound_and_keep_connected_flag() {
    let address = Ipv4Addr::new(192, 0, 2, 5);
    let (stack, controller) = controller(2);
    controller.start().unwrap();
    controller.handle_notification(got_ip(address));

    controller.handle_notification(lost());
    assert!(matches!(controller.current_phase(), Phase::Connecting));
    assert_eq!(controller.snapshot().retry_count, 0);
    assert_eq!(controller.outcome(), Some(Outcome::Connected(address)));

    for _ in 0..2 {
        controller.handle_notification(lost());
    }
    assert!(controller.snapshot().is_retrying());
    controller.handle_notification(lost());

    let signal = controller.signal();
    assert!(matches!(controller.current_phase(), Phase::Failed));
    assert!(signal.is_connected() && signal.is_failed());
    assert_eq!(controller.outcome(), Some(Outcome::Connected(address)));
    // start, reconnect after loss, two bounded retries
    assert_eq!(stack.calls(), 4);
}

#[test]
fn rejected_attempts_count_against_retry_bound() {
    let (stack, controller) = controller_with(ScriptedStack::rejecting(10), 2);
    assert_eq!(controller.start(), Ok(()));

    let snapshot = controller.snapshot();
    assert!(matches!(snapshot.phase, Phase::Failed));
    assert_eq!(snapshot.retry_count, 2);
    assert_eq!(stack.calls(), 3);
    assert_eq!(
        controller.await_outcome(Duration::ZERO),
        Ok(Outcome::Failed)
    );
}

#[test]
fn single_rejection_is_retried() {
    let (stack, controller) = controller_with(ScriptedStack::rejecting(1), 3);
    controller.start().unwrap();

    let snapshot = controller.snapshot();
    assert!(matches!(snapshot.phase, Phase::Connecting));
    assert_eq!(snapshot.retry_count, 1);
    assert_eq!(snapshot.attempts, 2);
    assert_eq!(stack.calls(), 2);
}

#[test]
fn rejection_during_retry_consumes_a_retry() {
    let (stack, controller) = controller(1);
    controller.start().unwrap();
    stack
        .rejections
        .lock()
        .push_back(StackError::NotStarted);
    controller.handle_notification(lost());

    assert!(matches!(controller.current_phase(), Phase::Failed));
    assert_eq!(stack.calls(), 2);
}

#[test]
fn reset_requires_settled_sequence() {
    let (stack, controller) = controller(0);
    controller.start().unwrap();
    assert_eq!(
        controller.reset(),
        Err(StationError::SequenceInFlight(Phase::Connecting))
    );

    controller.handle_notification(lost());
    let old_signal = controller.signal();
    assert_eq!(controller.reset(), Ok(()));
    assert!(matches!(controller.current_phase(), Phase::Idle));
    assert_eq!(controller.outcome(), None);
    assert!(old_signal.is_failed());

    controller.start().unwrap();
    controller.handle_notification(got_ip(Ipv4Addr::new(10, 1, 1, 1)));
    assert_eq!(
        controller.outcome(),
        Some(Outcome::Connected(Ipv4Addr::new(10, 1, 1, 1)))
    );
    assert_eq!(stack.calls(), 2);
}

#[test]
fn idle_reset_keeps_blocked_waiter_attached() {
    let address = Ipv4Addr::new(192, 0, 2, 5);
    let (_stack, controller) = controller(3);
    let controller = Arc::new(controller);
    let idle_signal = controller.signal();

    let waiter = {
        let controller = Arc::clone(&controller);
        thread::spawn(move || controller.await_outcome(Duration::from_secs(5)))
    };
    thread::sleep(Duration::from_millis(20));

    assert_eq!(controller.reset(), Ok(()));
    assert!(Arc::ptr_eq(&idle_signal, &controller.signal()));
    controller.start().unwrap();
    controller.handle_notification(got_ip(address));

    assert_eq!(waiter.join().unwrap(), Ok(Outcome::Connected(address)));
    assert_eq!(controller.outcome(), Some(Outcome::Connected(address)));
}

#[test]
fn blocked_waiter_wakes_on_address() {
    let address = Ipv4Addr::new(192, 0, 2, 5);
    let (_stack, controller) = controller(3);
    let controller = Arc::new(controller);
    controller.start().unwrap();

    let waiter = {
        let controller = Arc::clone(&controller);
        thread::spawn(move || controller.await_outcome(Duration::from_secs(5)))
    };
    thread::sleep(Duration::from_millis(20));
    controller.handle_notification(lost());
    controller.handle_notification(got_ip(address));

    assert_eq!(waiter.join().unwrap(), Ok(Outcome::Connected(address)));
}

#[test]
fn short_timeout_reports_waited_budget() {
    let (_stack, controller) = controller(3);
    controller.start().unwrap();
    let budget = Duration::from_millis(15);
    assert_eq!(
        controller.await_outcome(budget),
        Err(StationError::Timeout(budget))
    );
    // Recoverable: the sequence keeps going and can still settle.
    controller.handle_notification(got_ip(Ipv4Addr::new(192, 0, 2, 5)));
    assert!(controller.await_outcome(budget).is_ok());
}
