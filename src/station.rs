use std::{sync::Arc, time::Duration};

use log::{error, info};

use crate::{
    config::StationConfig,
    controller::{ConnectionController, Outcome},
    dispatcher::EventDispatcher,
    error::StationError,
    stack::StationStack,
};

/// Registers a fresh controller with `dispatcher`, starts the sequence and
/// blocks until it settles or `timeout` elapses.
///
/// The controller handle is returned alongside the wait result. On success it
/// stays registered so reconnects after a later link loss keep being handled.
/// On `Timeout` it also stays registered and keeps retrying, and the caller can
/// wait on it again. A `None` timeout waits indefinitely. The outer error is
/// reserved for a sequence that could not be started.
pub fn bring_up(
    config: StationConfig,
    stack: Arc<dyn StationStack>,
    dispatcher: &EventDispatcher,
    timeout: Option<Duration>,
) -> Result<(Arc<ConnectionController>, Result<Outcome, StationError>), StationError> {
    let controller = Arc::new(ConnectionController::new(config, stack));
    let token = dispatcher.register(controller.clone());
    info!(
        "station: controller registered token={} ssid={}",
        token.id(),
        controller.config().ssid()
    );

    if let Err(err) = controller.start() {
        dispatcher.unregister();
        return Err(err);
    }

    let outcome = match timeout {
        Some(timeout) => controller.await_outcome(timeout),
        None => Ok(controller.wait_outcome()),
    };

    match &outcome {
        Ok(settled) => match settled.address() {
            Some(address) => info!(
                "station: connected to ap SSID:{} ip:{}",
                controller.config().ssid(),
                address
            ),
            None => info!(
                "station: Failed to connect to SSID:{}",
                controller.config().ssid()
            ),
        },
        Err(err) => {
            error!(
                "station: no outcome for SSID:{} err={}",
                controller.config().ssid(),
                err
            );
        }
    }
    Ok((controller, outcome))
}
