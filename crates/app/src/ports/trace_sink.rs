//! Trace sink port — receives every device state change.

use terrarium_domain::event::StateChange;

/// Fire-and-forget receiver of [`StateChange`]s.
///
/// Called from inside a tick, so implementations must not block.
pub trait TraceSink {
    fn record(&self, change: StateChange);
}

impl<T: TraceSink + ?Sized> TraceSink for std::sync::Arc<T> {
    fn record(&self, change: StateChange) {
        (**self).record(change);
    }
}
