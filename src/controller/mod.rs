pub(crate) mod actions;
mod connection;
mod diag;
pub(crate) mod engine;
pub(crate) mod events;
mod machine;
mod signal;
mod snapshot;
#[cfg(test)]
mod tests;
mod types;

pub use connection::ConnectionController;
pub use signal::OutcomeSignal;
pub use snapshot::StationSnapshot;
pub use types::{Outcome, Phase};
