//! The open / decide / advance loop over the review queue.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use reviewdesk_core::approval::{Decision, Outcome};
use reviewdesk_core::types::{ReviewDetail, ReviewId, ReviewItem};
use reviewdesk_gateway::types::QueueFilter;
use reviewdesk_gateway::{GatewayError, ReviewGateway};

use crate::error::WorkflowError;
use crate::events::{EventBus, WorkflowEvent};
use crate::state::{Phase, WorkflowSnapshot, WorkflowState};

/// First pending / under-review item other than `decided`, in queue order.
///
/// Cached statuses may be stale; excluding the decided id is what keeps the
/// just-decided item from being reopened.
pub fn next_pending(queue: &[ReviewItem], decided: &ReviewId) -> Option<ReviewId> {
    queue
        .iter()
        .find(|item| item.is_open() && &item.id != decided)
        .map(|item| item.id.clone())
}

/// Handles for the work started by [`ReviewWorkflow::decide`].
#[derive(Debug)]
pub struct DecisionHandle {
    /// The item opened in place of the decided one, if any.
    pub advanced_to: Option<ReviewId>,
    /// Detail fetch for `advanced_to`.
    pub detail: Option<JoinHandle<()>>,
    /// Decision call followed by the queue refresh.
    pub background: JoinHandle<()>,
}

impl DecisionHandle {
    /// Wait for every task this decision started.
    pub async fn settled(self) {
        if let Some(detail) = self.detail {
            if let Err(e) = detail.await {
                tracing::error!(error = %e, "Detail task failed to complete");
            }
        }
        if let Err(e) = self.background.await {
            tracing::error!(error = %e, "Decision task failed to complete");
        }
    }
}

/// Review workflow controller.
///
/// Cheap to clone; clones share state. Operations that touch the network
/// return immediately with a [`JoinHandle`] for the detached task, so the
/// caller is never blocked on the gateway.
///
/// Every error an operation returns has already been written to the error
/// slot and published as [`WorkflowEvent::Error`].
pub struct ReviewWorkflow<G> {
    gateway: Arc<G>,
    state: Arc<Mutex<WorkflowState>>,
    events: Arc<EventBus>,
}

impl<G> Clone for ReviewWorkflow<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            state: Arc::clone(&self.state),
            events: Arc::clone(&self.events),
        }
    }
}

impl<G: ReviewGateway> ReviewWorkflow<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self::with_filter(gateway, QueueFilter::default())
    }

    pub fn with_filter(gateway: Arc<G>, filter: QueueFilter) -> Self {
        Self {
            gateway,
            state: Arc::new(Mutex::new(WorkflowState {
                filter,
                ..Default::default()
            })),
            events: Arc::new(EventBus::default()),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        self.lock().snapshot()
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase()
    }

    pub fn selection(&self) -> Option<ReviewId> {
        self.lock().selection.clone()
    }

    pub fn queue(&self) -> Vec<ReviewItem> {
        self.lock().queue.clone()
    }

    pub fn detail(&self) -> Option<ReviewDetail> {
        self.lock().detail.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn dismiss_error(&self) {
        self.lock().error = None;
    }

    // ---- queue ----

    /// Fetch the queue and replace the snapshot wholesale.
    ///
    /// Failures are written to the error slot and returned.
    pub async fn reload(&self) -> Result<usize, WorkflowError> {
        let filter = self.lock().filter.clone();
        match self.gateway.pending_reviews(&filter).await {
            Ok(items) => Ok(self.replace_queue(items)),
            Err(e) => {
                let err = WorkflowError::from(e);
                self.report(&err);
                Err(err)
            }
        }
    }

    /// [`reload`](Self::reload) as a detached task.
    ///
    /// Overlapping refreshes are not ordered: whichever resolves last
    /// determines the queue.
    pub fn refresh(&self) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            let _ = this.reload().await;
        })
    }

    /// Change the queue filter and refresh with it.
    pub fn set_filter(&self, filter: QueueFilter) -> JoinHandle<()> {
        self.lock().filter = filter;
        self.refresh()
    }

    fn replace_queue(&self, items: Vec<ReviewItem>) -> usize {
        let count = items.len();
        self.lock().queue = items;
        tracing::info!(count, "Review queue replaced");
        self.events.publish(WorkflowEvent::QueueReplaced { count });
        count
    }

    // ---- selection ----

    /// Select an item from the queue and fetch its detail in the background.
    pub fn open(&self, id: &ReviewId) -> Result<JoinHandle<()>, WorkflowError> {
        let generation = {
            let mut state = self.lock();
            if !state.queue.iter().any(|item| &item.id == id) {
                drop(state);
                return self.reported(Err(WorkflowError::NotInQueue(id.clone())));
            }
            state.begin_open(id)
        };
        tracing::debug!(review_id = %id, generation, "Opening review");
        Ok(self.spawn_detail_fetch(id.clone(), generation))
    }

    /// Close the detail view. In-flight detail fetches are left to finish
    /// and their results discarded.
    pub fn close(&self) {
        self.lock().close_detail();
    }

    fn spawn_detail_fetch(&self, id: ReviewId, generation: u64) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            let result = this.gateway.review_detail(&id).await;
            this.apply_detail(&id, generation, result);
        })
    }

    fn apply_detail(
        &self,
        id: &ReviewId,
        generation: u64,
        result: Result<ReviewDetail, GatewayError>,
    ) {
        let failure = {
            let mut state = self.lock();
            if state.detail_generation != generation || state.selection.as_ref() != Some(id) {
                tracing::debug!(review_id = %id, generation, "Discarding stale detail response");
                return;
            }
            match result {
                Ok(detail) if &detail.id == id => {
                    state.detail = Some(detail);
                    None
                }
                Ok(detail) => {
                    tracing::warn!(
                        review_id = %id,
                        returned_id = %detail.id,
                        "Detail response was for a different review, discarding"
                    );
                    return;
                }
                Err(e) => {
                    state.detail_failed = true;
                    Some(e)
                }
            }
        };

        match failure {
            None => self
                .events
                .publish(WorkflowEvent::DetailLoaded { id: id.clone() }),
            Some(e) => {
                tracing::warn!(review_id = %id, error = %e, "Failed to load review details");
                self.report(&WorkflowError::from(e));
            }
        }
    }

    // ---- decisions ----

    /// Approve or reject an item.
    ///
    /// If `id` is the open item, the next pending item from the current
    /// snapshot is opened right away (or the view closes when there is
    /// none), before the decision call is even issued. The decision call
    /// and the subsequent refresh run in the background; their failures
    /// are reported but never undo the advancement.
    ///
    /// Rejections need a non-blank `reason`; validation failures return
    /// early without touching the gateway.
    pub fn decide(
        &self,
        id: &ReviewId,
        outcome: Outcome,
        reason: Option<&str>,
    ) -> Result<DecisionHandle, WorkflowError> {
        let decision = Decision::new(outcome, reason).map_err(|e| {
            let err = WorkflowError::from(e);
            self.report(&err);
            err
        })?;

        let advance = {
            let mut state = self.lock();
            state.pending_decision = Some(id.clone());
            if state.selection.as_ref() == Some(id) {
                match next_pending(&state.queue, id) {
                    Some(next) => {
                        let generation = state.begin_open(&next);
                        Some((next, generation))
                    }
                    None => {
                        state.close_detail();
                        None
                    }
                }
            } else {
                None
            }
        };

        let (advanced_to, detail) = match advance {
            Some((next, generation)) => {
                tracing::debug!(decided = %id, next = %next, "Advancing to next review");
                let handle = self.spawn_detail_fetch(next.clone(), generation);
                (Some(next), Some(handle))
            }
            None => (None, None),
        };

        let background = self.spawn_decision_chain(id.clone(), decision);

        Ok(DecisionHandle {
            advanced_to,
            detail,
            background,
        })
    }

    fn spawn_decision_chain(&self, id: ReviewId, decision: Decision) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            tracing::info!(
                review_id = %id,
                action = decision.outcome().action(),
                "Submitting decision"
            );
            match this.gateway.submit_decision(&id, &decision).await {
                Ok(receipt) => {
                    this.events.publish(WorkflowEvent::DecisionRecorded {
                        id: id.clone(),
                        status: receipt.status,
                    });
                    // Errors are reported by reload itself.
                    let _ = this.reload().await;
                }
                Err(e) => {
                    tracing::warn!(review_id = %id, error = %e, "Decision failed");
                    this.report(&WorkflowError::from(e));
                }
            }

            let mut state = this.lock();
            if state.pending_decision.as_ref() == Some(&id) {
                state.pending_decision = None;
            }
        })
    }

    // ---- shared helpers ----

    pub(crate) fn gateway(&self) -> &G {
        &self.gateway
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, WorkflowState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Write a failure to the error slot and notify subscribers.
    pub(crate) fn report(&self, err: &WorkflowError) {
        self.surface(err.to_string(), err.is_unauthorized());
    }

    /// Report the error of a failed result and pass the result through.
    pub(crate) fn reported<T>(&self, result: Result<T, WorkflowError>) -> Result<T, WorkflowError> {
        if let Err(e) = &result {
            self.report(e);
        }
        result
    }

    /// Like [`report`](Self::report) with an operator-facing message of
    /// the caller's choosing.
    pub(crate) fn surface(&self, message: String, unauthorized: bool) {
        self.lock().error = Some(message.clone());
        self.events.publish(WorkflowEvent::Error { message });
        if unauthorized {
            tracing::warn!("Session expired, operator must log in again");
            self.events.publish(WorkflowEvent::SessionExpired);
        }
    }
}
