//! Wi-Fi station connection sequencing.
//!
//! A [`ConnectionController`] drives one connection sequence against an
//! underlying [`StationStack`]: it issues the first attempt, retries on link
//! loss up to the configured bound, and latches a terminal outcome that any
//! number of callers can block on. Stack notifications reach the controller
//! through an [`EventDispatcher`].

pub mod config;
pub mod controller;
pub mod dispatcher;
pub mod error;
pub mod notification;
pub mod stack;
pub mod station;

pub use config::{StationConfig, DEFAULT_MAX_RETRIES, WIFI_PASSWORD_MAX, WIFI_SSID_MAX};
pub use controller::{ConnectionController, Outcome, OutcomeSignal, Phase, StationSnapshot};
pub use dispatcher::{EventDispatcher, NotificationHandler, RegistrationToken};
pub use error::{ConfigError, StackError, StationError};
pub use notification::{disconnect_reason_label, Notification, NotificationKind};
pub use stack::StationStack;
pub use station::bring_up;
