use std::net::Ipv4Addr;

use super::types::Phase;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct StationSnapshot {
    pub phase: Phase,
    pub retry_count: u32,
    pub max_retries: u32,
    pub attempts: u32,
    pub address: Option<Ipv4Addr>,
}

impl StationSnapshot {
    pub const fn new(max_retries: u32) -> Self {
        Self {
            phase: Phase::Idle,
            retry_count: 0,
            max_retries,
            attempts: 0,
            address: None,
        }
    }

    /// Connecting again after at least one lost or rejected attempt.
    pub const fn is_retrying(&self) -> bool {
        matches!(self.phase, Phase::Connecting) && self.retry_count > 0
    }

    pub const fn retries_exhausted(&self) -> bool {
        self.retry_count >= self.max_retries
    }

    pub(crate) const fn phase_label(&self) -> &'static str {
        if self.is_retrying() {
            "Retrying"
        } else {
            self.phase.as_str()
        }
    }
}
