use std::net::Ipv4Addr;

/// Reason code recorded when the stack refuses to begin an attempt.
pub const REASON_ATTEMPT_REJECTED: u8 = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    AttemptStartable,
    LinkLost,
    AddressAcquired,
}

impl NotificationKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AttemptStartable => "attempt_startable",
            Self::LinkLost => "link_lost",
            Self::AddressAcquired => "address_acquired",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notification {
    AttemptStartable,
    LinkLost { reason: u8 },
    AddressAcquired(Ipv4Addr),
}

impl Notification {
    pub const fn kind(&self) -> NotificationKind {
        match self {
            Self::AttemptStartable => NotificationKind::AttemptStartable,
            Self::LinkLost { .. } => NotificationKind::LinkLost,
            Self::AddressAcquired(_) => NotificationKind::AddressAcquired,
        }
    }
}

pub fn disconnect_reason_label(reason: u8) -> &'static str {
    match reason {
        REASON_ATTEMPT_REJECTED => "attempt_rejected",
        2 => "auth_expire",
        4 => "assoc_expire",
        8 => "assoc_leave",
        15 => "4way_handshake_timeout",
        200 => "beacon_timeout",
        201 => "no_ap_found",
        202 => "auth_fail",
        203 => "assoc_fail",
        204 => "handshake_timeout",
        205 => "connection_fail",
        210 => "no_ap_found_compatible_security",
        211 => "no_ap_found_authmode_threshold",
        212 => "no_ap_found_rssi_threshold",
        _ => "other",
    }
}
