use std::{
    sync::Arc,
    thread::{self, ThreadId},
};

use log::{debug, warn};
use parking_lot::Mutex;

use crate::notification::Notification;

/// Receiver side of the dispatcher. Handlers absorb their own failures.
pub trait NotificationHandler: Send + Sync {
    fn on_notification(&self, notification: Notification);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RegistrationToken(u32);

impl RegistrationToken {
    pub const fn id(self) -> u32 {
        self.0
    }
}

struct Registration {
    token: RegistrationToken,
    handler: Arc<dyn NotificationHandler>,
}

struct Slot {
    next_id: u32,
    active: Option<Registration>,
}

pub struct EventDispatcher {
    slot: Mutex<Slot>,
    // Held for the whole handler call so deliveries never overlap.
    delivery: Mutex<()>,
    // Thread currently inside a handler call.
    delivering: Mutex<Option<ThreadId>>,
}

struct DeliveringGuard<'a>(&'a Mutex<Option<ThreadId>>);

impl Drop for DeliveringGuard<'_> {
    fn drop(&mut self) {
        *self.0.lock() = None;
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                next_id: 1,
                active: None,
            }),
            delivery: Mutex::new(()),
            delivering: Mutex::new(None),
        }
    }

    /// Subscribes `handler` to every notification kind, replacing any
    /// previous registration.
    pub fn register(&self, handler: Arc<dyn NotificationHandler>) -> RegistrationToken {
        let mut slot = self.slot.lock();
        let token = RegistrationToken(slot.next_id);
        slot.next_id = slot.next_id.wrapping_add(1).max(1);
        if let Some(previous) = slot.active.replace(Registration { token, handler }) {
            debug!(
                "station: dispatcher registration replaced old={} new={}",
                previous.token.id(),
                token.id()
            );
        }
        token
    }

    /// Returns whether a registration was actually released.
    pub fn unregister(&self) -> bool {
        let released = self.slot.lock().active.take();
        if let Some(registration) = &released {
            debug!(
                "station: dispatcher unregistered token={}",
                registration.token.id()
            );
        }
        released.is_some()
    }

    pub fn token(&self) -> Option<RegistrationToken> {
        self.slot.lock().active.as_ref().map(|r| r.token)
    }

    pub fn is_registered(&self) -> bool {
        self.token().is_some()
    }

    /// Forwards `notification` to the registered handler and returns once the
    /// handler has returned. Without a registration the notification is
    /// dropped and `false` is returned.
    ///
    /// A delivery made from inside a handler call on the same thread would
    /// deadlock on the serializing lock; it is dropped with a warning and
    /// `false` is returned instead.
    pub fn deliver(&self, notification: Notification) -> bool {
        let current = thread::current().id();
        if *self.delivering.lock() == Some(current) {
            warn!(
                "station: dropped re-entrant {} delivered from inside a handler",
                notification.kind().as_str()
            );
            return false;
        }
        let _serial = self.delivery.lock();
        *self.delivering.lock() = Some(current);
        let _delivering = DeliveringGuard(&self.delivering);
        let handler = self
            .slot
            .lock()
            .active
            .as_ref()
            .map(|r| Arc::clone(&r.handler));
        match handler {
            Some(handler) => {
                handler.on_notification(notification);
                true
            }
            None => {
                debug!(
                    "station: dropped {} with no handler registered",
                    notification.kind().as_str()
                );
                false
            }
        }
    }
}
