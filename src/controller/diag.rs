use std::time::{Duration, Instant};

use log::debug;

use super::engine::TransitionResult;

pub(super) fn emit_net_event(result: &TransitionResult, trigger: &str, started_at: Instant) {
    debug!(
        "NET_EVENT {{\"from\":\"{}\",\"to\":\"{}\",\"trigger\":\"{}\",\"retry\":{},\"attempts\":{},\"at_ms\":{}}}",
        result.before.phase_label(),
        result.after.phase_label(),
        trigger,
        result.after.retry_count,
        result.after.attempts,
        saturating_millis(started_at.elapsed())
    );
}

fn saturating_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
