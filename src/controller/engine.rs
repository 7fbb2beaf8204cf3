use statig::blocking::IntoStateMachineExt as _;

use super::actions::{StationAction, TransitionStatus};
use super::events::StationEvent;
use super::machine::{DispatchContext, StationMachine};
use super::snapshot::StationSnapshot;

#[derive(Clone, Copy, Debug)]
pub(crate) struct TransitionResult {
    pub(crate) before: StationSnapshot,
    pub(crate) after: StationSnapshot,
    pub(crate) status: TransitionStatus,
    pub(crate) action: Option<StationAction>,
}

impl TransitionResult {
    pub(crate) fn applied(self) -> bool {
        matches!(self.status, TransitionStatus::Applied)
    }

    pub(crate) fn phase_changed(self) -> bool {
        self.before.phase != self.after.phase
    }
}

pub(crate) struct StationEngine {
    machine: statig::blocking::StateMachine<StationMachine>,
}

impl StationEngine {
    pub(crate) fn new(max_retries: u32) -> Self {
        Self {
            machine: StationMachine::new(max_retries).state_machine(),
        }
    }

    pub(crate) fn snapshot(&self) -> StationSnapshot {
        self.machine.inner().snapshot
    }

    pub(crate) fn apply(&mut self, event: StationEvent) -> TransitionResult {
        let before = self.snapshot();
        let mut context = DispatchContext::default();
        self.machine.handle_with_context(&event, &mut context);
        let after = self.snapshot();
        TransitionResult {
            before,
            after,
            status: context.status,
            action: context.action,
        }
    }
}
