use std::net::Ipv4Addr;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum TransitionStatus {
    Applied,
    Ignored,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum StationAction {
    BeginAttempt,
    SignalConnected(Ipv4Addr),
    SignalFailed,
}
