//! In-process fan-out of match updates over a tokio broadcast channel.
//!
//! Publishing never blocks. Receivers that fall more than the channel
//! capacity behind observe `RecvError::Lagged` and skip ahead.

use tokio::sync::broadcast;
use tracing::trace;

use crate::domain::MatchUpdate;
use crate::domain::ports::{MatchUpdateFeed, MatchUpdatePublisher};

/// Default number of updates buffered per subscriber.
pub const DEFAULT_CAPACITY: usize = 256;

/// Hub implementing both sides of the match update ports.
#[derive(Debug, Clone)]
pub struct MatchUpdateHub {
    sender: broadcast::Sender<MatchUpdate>,
}

impl Default for MatchUpdateHub {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl MatchUpdateHub {
    /// Hub buffering up to `capacity` updates per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl MatchUpdatePublisher for MatchUpdateHub {
    fn publish(&self, update: MatchUpdate) -> usize {
        match self.sender.send(update) {
            Ok(receivers) => receivers,
            Err(_) => {
                trace!("no live subscribers; match update dropped");
                0
            }
        }
    }
}

impl MatchUpdateFeed for MatchUpdateHub {
    fn subscribe(&self) -> broadcast::Receiver<MatchUpdate> {
        self.sender.subscribe()
    }
}
