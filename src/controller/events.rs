use crate::notification::Notification;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum StationEvent {
    Start,
    Notify(Notification),
    // The stack refused to begin an attempt; counted like a link loss.
    AttemptRejected,
}

impl StationEvent {
    pub(crate) const fn label(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Notify(notification) => notification.kind().as_str(),
            Self::AttemptRejected => "attempt_rejected",
        }
    }
}
