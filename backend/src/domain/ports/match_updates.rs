//! Ports for fanning out fixture changes to live subscribers.

use tokio::sync::broadcast;

use crate::domain::MatchUpdate;

/// Driven port used by the match service after each successful write.
///
/// Publishing never blocks and never fails the write: with no subscribers the
/// update is simply dropped.
#[cfg_attr(test, mockall::automock)]
pub trait MatchUpdatePublisher: Send + Sync {
    /// Publish an update; returns how many subscribers received it.
    fn publish(&self, update: MatchUpdate) -> usize;
}

/// Port used by live transports to receive fixture changes.
pub trait MatchUpdateFeed: Send + Sync {
    /// Open a new subscription that sees updates published from now on.
    fn subscribe(&self) -> broadcast::Receiver<MatchUpdate>;
}
