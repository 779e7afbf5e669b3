//! Trace bus — fans device state changes out to in-process listeners.
//!
//! The arbiter records changes synchronously while it holds the controller
//! lock, so recording never waits on a listener. A listener that falls more
//! than `capacity` changes behind loses the oldest ones and is told how many
//! through [`broadcast::error::RecvError::Lagged`].

use tokio::sync::broadcast;

use terrarium_domain::event::StateChange;

use crate::ports::TraceSink;

pub struct InProcessTraceBus {
    sender: broadcast::Sender<StateChange>,
}

impl InProcessTraceBus {
    /// `capacity` is the number of changes kept for the slowest listener.
    ///
    /// # Panics
    ///
    /// Panics when `capacity` is zero; the daemon configuration rejects it
    /// before the bus is built.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Listen to the changes recorded from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.sender.subscribe()
    }

    #[must_use]
    pub fn listeners(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl TraceSink for InProcessTraceBus {
    fn record(&self, change: StateChange) {
        if self.sender.send(change).is_err() {
            tracing::trace!("state change dropped, nobody is listening");
        }
    }
}
