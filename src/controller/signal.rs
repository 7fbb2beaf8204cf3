use std::{
    net::Ipv4Addr,
    time::{Duration, Instant},
};

use parking_lot::{Condvar, Mutex};

use super::types::Outcome;

#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
struct OutcomeFlags {
    connected: Option<Ipv4Addr>,
    failed: bool,
}

impl OutcomeFlags {
    // Connected wins when both are latched: the sequence did succeed once.
    fn outcome(self) -> Option<Outcome> {
        match (self.connected, self.failed) {
            (Some(address), _) => Some(Outcome::Connected(address)),
            (None, true) => Some(Outcome::Failed),
            (None, false) => None,
        }
    }
}

/// Two latched flags shared between the notification context and waiters.
///
/// Flags are never cleared; reads never consume them. A new connection
/// sequence gets a new signal.
#[derive(Default)]
pub struct OutcomeSignal {
    flags: Mutex<OutcomeFlags>,
    settled: Condvar,
}

impl OutcomeSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latches `CONNECTED`. Returns `false` when it was already set.
    pub fn set_connected(&self, address: Ipv4Addr) -> bool {
        let mut flags = self.flags.lock();
        if flags.connected.is_some() {
            return false;
        }
        flags.connected = Some(address);
        self.settled.notify_all();
        true
    }

    /// Latches `FAILED`. Returns `false` when it was already set.
    pub fn set_failed(&self) -> bool {
        let mut flags = self.flags.lock();
        if flags.failed {
            return false;
        }
        flags.failed = true;
        self.settled.notify_all();
        true
    }

    pub fn is_connected(&self) -> bool {
        self.flags.lock().connected.is_some()
    }

    pub fn is_failed(&self) -> bool {
        self.flags.lock().failed
    }

    pub fn peek(&self) -> Option<Outcome> {
        self.flags.lock().outcome()
    }

    /// Blocks until a flag is latched or `timeout` elapses.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Outcome> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return Some(self.wait());
        };
        let mut flags = self.flags.lock();
        loop {
            if let Some(outcome) = flags.outcome() {
                return Some(outcome);
            }
            if self.settled.wait_until(&mut flags, deadline).timed_out() {
                return flags.outcome();
            }
        }
    }

    pub fn wait(&self) -> Outcome {
        let mut flags = self.flags.lock();
        loop {
            if let Some(outcome) = flags.outcome() {
                return outcome;
            }
            self.settled.wait(&mut flags);
        }
    }
}
