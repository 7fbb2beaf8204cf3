use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use log::{debug, info, warn};
use parking_lot::Mutex;

use super::actions::StationAction;
use super::diag::emit_net_event;
use super::engine::StationEngine;
use super::events::StationEvent;
use super::signal::OutcomeSignal;
use super::snapshot::StationSnapshot;
use super::types::{Outcome, Phase};
use crate::{
    config::StationConfig, dispatcher::NotificationHandler, error::StationError,
    notification::Notification, stack::StationStack,
};

struct Sequence {
    engine: StationEngine,
    signal: Arc<OutcomeSignal>,
    started_at: Instant,
}

impl Sequence {
    fn new(max_retries: u32) -> Self {
        Self {
            engine: StationEngine::new(max_retries),
            signal: Arc::new(OutcomeSignal::new()),
            started_at: Instant::now(),
        }
    }

    /// Runs one full transition, latching any outcome flag before returning.
    /// Returns `true` when the caller must issue a connect attempt.
    fn transition(&mut self, event: StationEvent) -> bool {
        let result = self.engine.apply(event);
        if !result.applied() {
            return false;
        }
        emit_net_event(&result, event.label(), self.started_at);
        if result.phase_changed() && result.after.phase.is_terminal() {
            info!(
                "station: sequence settled phase={} attempts={}",
                result.after.phase.as_str(),
                result.after.attempts
            );
        }
        match result.action {
            Some(StationAction::BeginAttempt) => true,
            Some(StationAction::SignalConnected(address)) => {
                if !self.signal.set_connected(address) {
                    debug!("station: connected flag already latched address={}", address);
                }
                false
            }
            Some(StationAction::SignalFailed) => {
                self.signal.set_failed();
                false
            }
            None => false,
        }
    }
}

/// Retry-bounded connection state machine for one station interface.
///
/// Notification handling never fails outward: unexpected notifications are
/// absorbed and stack errors count as lost attempts.
pub struct ConnectionController {
    config: StationConfig,
    stack: Arc<dyn StationStack>,
    sequence: Mutex<Sequence>,
}

impl ConnectionController {
    pub fn new(config: StationConfig, stack: Arc<dyn StationStack>) -> Self {
        let sequence = Sequence::new(config.max_retries());
        Self {
            config,
            stack,
            sequence: Mutex::new(sequence),
        }
    }

    pub fn config(&self) -> &StationConfig {
        &self.config
    }

    pub fn start(&self) -> Result<(), StationError> {
        let attempt = {
            let mut sequence = self.sequence.lock();
            let phase = sequence.engine.snapshot().phase;
            if phase != Phase::Idle {
                return Err(StationError::AlreadyStarted(phase));
            }
            sequence.started_at = Instant::now();
            info!(
                "station: starting ssid={} max_retries={} open={}",
                self.config.ssid(),
                self.config.max_retries(),
                self.config.is_open()
            );
            sequence.transition(StationEvent::Start)
        };
        if attempt {
            self.issue_attempts();
        }
        Ok(())
    }

    pub fn await_outcome(&self, timeout: Duration) -> Result<Outcome, StationError> {
        self.signal()
            .wait_timeout(timeout)
            .ok_or(StationError::Timeout(timeout))
    }

    /// Waits with no deadline.
    pub fn wait_outcome(&self) -> Outcome {
        self.signal().wait()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.signal().peek()
    }

    pub fn current_phase(&self) -> Phase {
        self.sequence.lock().engine.snapshot().phase
    }

    pub fn snapshot(&self) -> StationSnapshot {
        self.sequence.lock().engine.snapshot()
    }

    pub fn signal(&self) -> Arc<OutcomeSignal> {
        Arc::clone(&self.sequence.lock().signal)
    }

    /// Discards a settled sequence so `start` can run again with fresh flags.
    ///
    /// An idle controller is left untouched: callers already blocked on its
    /// signal must see the outcome of the next `start`.
    pub fn reset(&self) -> Result<(), StationError> {
        let mut sequence = self.sequence.lock();
        let phase = sequence.engine.snapshot().phase;
        match phase {
            Phase::Idle => return Ok(()),
            Phase::Connecting => return Err(StationError::SequenceInFlight(phase)),
            Phase::Connected | Phase::Failed => {}
        }
        *sequence = Sequence::new(self.config.max_retries());
        info!("station: sequence reset from phase={}", phase.as_str());
        Ok(())
    }

    pub fn handle_notification(&self, notification: Notification) {
        let attempt = self
            .sequence
            .lock()
            .transition(StationEvent::Notify(notification));
        if attempt {
            self.issue_attempts();
        }
    }

    // Called without the sequence lock held; a rejected attempt is fed back
    // as a lost one until the stack accepts or the retry bound is hit.
    fn issue_attempts(&self) {
        loop {
            match self.stack.begin_attempt() {
                Ok(()) => return,
                Err(err) => {
                    warn!("station: begin attempt err={}", err);
                    let retry = self
                        .sequence
                        .lock()
                        .transition(StationEvent::AttemptRejected);
                    if !retry {
                        return;
                    }
                }
            }
        }
    }
}

impl NotificationHandler for ConnectionController {
    fn on_notification(&self, notification: Notification) {
        self.handle_notification(notification);
    }
}
