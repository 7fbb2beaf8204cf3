use core::time::Duration;

use thiserror::Error;

use crate::controller::Phase;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum StationError {
    #[error("connection sequence already started (phase={})", .0.as_str())]
    AlreadyStarted(Phase),
    #[error("no terminal outcome within {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("connection sequence still in flight (phase={})", .0.as_str())]
    SequenceInFlight(Phase),
}

/// Failure reported by the underlying stack when it cannot even begin an attempt.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StackError {
    #[error("station interface not started")]
    NotStarted,
    #[error("driver fault code={code}")]
    Driver { code: i32 },
    #[error("{0}")]
    Other(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("ssid is empty")]
    EmptySsid,
    #[error("ssid is {len} bytes, max {max}")]
    SsidTooLong { len: usize, max: usize },
    #[error("credential is {len} bytes, max {max}")]
    CredentialTooLong { len: usize, max: usize },
    #[error("invalid max_retries value {0:?}")]
    InvalidMaxRetries(String),
    #[error("station config parse failed: {0}")]
    Parse(String),
}
