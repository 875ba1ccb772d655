//! Workflow notifications backed by a `tokio::sync::broadcast` channel.
//!
//! Front ends subscribe to learn about queue replacement, loaded details,
//! recorded decisions and failures from background chains.

use tokio::sync::broadcast;

use reviewdesk_core::types::{ReviewId, ReviewStatus};

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowEvent {
    /// The queue snapshot was replaced wholesale.
    QueueReplaced { count: usize },
    /// Detail for the current selection finished loading.
    DetailLoaded { id: ReviewId },
    /// The gateway accepted a decision.
    DecisionRecorded { id: ReviewId, status: ReviewStatus },
    /// A failure was written to the error slot.
    Error { message: String },
    /// The gateway rejected the session; the operator must log in again.
    SessionExpired,
}

/// Fan-out of [`WorkflowEvent`]s to any number of subscribers.
pub struct EventBus {
    sender: broadcast::Sender<WorkflowEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current subscribers. Dropped when there are none.
    pub fn publish(&self, event: WorkflowEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
