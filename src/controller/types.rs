use std::net::Ipv4Addr;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Idle,
    Connecting,
    Connected,
    Failed,
}

impl Phase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Connecting => "Connecting",
            Self::Connected => "Connected",
            Self::Failed => "Failed",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Connected | Self::Failed)
    }
}

/// Terminal result of one connection sequence.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Connected(Ipv4Addr),
    Failed,
}

impl Outcome {
    pub const fn address(self) -> Option<Ipv4Addr> {
        match self {
            Self::Connected(address) => Some(address),
            Self::Failed => None,
        }
    }
}
