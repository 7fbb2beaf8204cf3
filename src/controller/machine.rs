use log::{debug, info};
use statig::prelude::*;

use super::actions::{StationAction, TransitionStatus};
use super::events::StationEvent;
use super::snapshot::StationSnapshot;
use super::types::Phase;
use crate::notification::{disconnect_reason_label, Notification, REASON_ATTEMPT_REJECTED};

#[derive(Clone, Copy, Debug)]
pub(super) struct StationMachine {
    pub(super) snapshot: StationSnapshot,
}

#[derive(Clone, Copy, Debug)]
pub(super) struct DispatchContext {
    pub(super) status: TransitionStatus,
    pub(super) action: Option<StationAction>,
}

impl Default for DispatchContext {
    fn default() -> Self {
        Self {
            status: TransitionStatus::Ignored,
            action: None,
        }
    }
}

impl DispatchContext {
    fn apply(&mut self, action: StationAction) {
        self.status = TransitionStatus::Applied;
        self.action = Some(action);
    }
}

impl StationMachine {
    pub(super) fn new(max_retries: u32) -> Self {
        Self {
            snapshot: StationSnapshot::new(max_retries),
        }
    }

    fn begin_attempt(&mut self, context: &mut DispatchContext) {
        self.snapshot.phase = Phase::Connecting;
        self.snapshot.attempts = self.snapshot.attempts.saturating_add(1);
        context.apply(StationAction::BeginAttempt);
    }

    fn on_attempt_lost(&mut self, context: &mut DispatchContext, reason: u8) -> Outcome<State> {
        info!(
            "station: connect to the AP fail reason={} ({})",
            reason,
            disconnect_reason_label(reason)
        );
        if self.snapshot.retries_exhausted() {
            self.snapshot.phase = Phase::Failed;
            context.apply(StationAction::SignalFailed);
            return Transition(State::failed());
        }
        self.snapshot.retry_count += 1;
        info!(
            "station: retry to connect to the AP retry={}/{}",
            self.snapshot.retry_count, self.snapshot.max_retries
        );
        self.begin_attempt(context);
        Handled
    }

    fn ignore(&self, event: &StationEvent) -> Outcome<State> {
        debug!(
            "station: ignored {} in phase={}",
            event.label(),
            self.snapshot.phase.as_str()
        );
        Handled
    }
}

#[state_machine(initial = "State::idle()")]
impl StationMachine {
    #[state]
    fn idle(&mut self, context: &mut DispatchContext, event: &StationEvent) -> Outcome<State> {
        match event {
            StationEvent::Start | StationEvent::Notify(Notification::AttemptStartable) => {
                self.begin_attempt(context);
                Transition(State::connecting())
            }
            _ => self.ignore(event),
        }
    }

    #[state]
    fn connecting(
        &mut self,
        context: &mut DispatchContext,
        event: &StationEvent,
    ) -> Outcome<State> {
        match event {
            StationEvent::Notify(Notification::LinkLost { reason }) => {
                self.on_attempt_lost(context, *reason)
            }
            StationEvent::AttemptRejected => {
                self.on_attempt_lost(context, REASON_ATTEMPT_REJECTED)
            }
            StationEvent::Notify(Notification::AddressAcquired(address)) => {
                info!("station: got ip:{}", address);
                self.snapshot.retry_count = 0;
                self.snapshot.address = Some(*address);
                self.snapshot.phase = Phase::Connected;
                context.apply(StationAction::SignalConnected(*address));
                Transition(State::connected())
            }
            _ => self.ignore(event),
        }
    }

    #[state]
    fn connected(
        &mut self,
        context: &mut DispatchContext,
        event: &StationEvent,
    ) -> Outcome<State> {
        match event {
            StationEvent::Notify(Notification::LinkLost { reason }) => {
                info!(
                    "station: link lost after connect reason={} ({}); reconnecting",
                    reason,
                    disconnect_reason_label(*reason)
                );
                self.snapshot.address = None;
                self.begin_attempt(context);
                Transition(State::connecting())
            }
            _ => self.ignore(event),
        }
    }

    #[state]
    fn failed(&mut self, event: &StationEvent) -> Outcome<State> {
        self.ignore(event)
    }
}
