use std::sync::Arc;

use crate::error::StackError;

/// The "begin connection attempt" half of the underlying network stack.
///
/// The call only starts an attempt; its result arrives later as
/// notifications. Implementations must not deliver notifications
/// synchronously from inside `begin_attempt`: when the call is made from a
/// handler, `EventDispatcher::deliver` drops such a notification with a
/// warning and the attempt's result is lost.
pub trait StationStack: Send + Sync {
    fn begin_attempt(&self) -> Result<(), StackError>;
}

impl<T: StationStack + ?Sized> StationStack for Arc<T> {
    fn begin_attempt(&self) -> Result<(), StackError> {
        (**self).begin_attempt()
    }
}
