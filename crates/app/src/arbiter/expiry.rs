use std::sync::Arc;

use terrarium_domain::device::Owner;
use terrarium_domain::time::Timestamp;

use super::{Arbiter, skip_on_error};
use crate::ports::TraceSink;

impl<T: TraceSink> Arbiter<T> {
    /// Switches off, in registry order, every device whose end time is due.
    ///
    /// The horizon is read again for each device, so a device already
    /// released by an earlier cascade in the same sweep is left alone.
    pub(super) fn check_expiry(&mut self, now: Timestamp) {
        let registry = Arc::clone(&self.registry);
        for device in registry.names() {
            let expired = self
                .states
                .get(device)
                .is_some_and(|state| state.horizon().is_expired(now));
            if expired {
                skip_on_error(self.turn_off(device, Owner::NotControlled, now), "expiry");
            }
        }
    }
}
