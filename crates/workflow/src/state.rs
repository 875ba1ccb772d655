//! Mutable controller state and its read-only snapshot.

use reviewdesk_core::site_edit::SiteDraft;
use reviewdesk_core::types::{Area, Block, ReviewDetail, ReviewId, ReviewItem};
use reviewdesk_gateway::types::QueueFilter;

/// Where the detail view stands for the current selection.
///
/// A decision in flight does not change the phase: the view has already
/// advanced by the time the decision call starts. It is reported through
/// [`WorkflowSnapshot::pending_decision`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing selected.
    Idle,
    /// Selection set, detail fetch in flight.
    DetailLoading,
    /// The detail fetch failed; reselect to retry.
    DetailFailed,
    DetailReady,
}

/// Everything the controller owns. Guarded by a single mutex that is never
/// held across an `.await`.
#[derive(Debug, Default)]
pub(crate) struct WorkflowState {
    pub queue: Vec<ReviewItem>,
    pub filter: QueueFilter,
    pub selection: Option<ReviewId>,
    pub detail: Option<ReviewDetail>,
    pub detail_failed: bool,
    /// Bumped on every selection change; detail responses carrying an
    /// older generation are discarded.
    pub detail_generation: u64,
    pub pending_decision: Option<ReviewId>,
    pub error: Option<String>,
    pub areas: Vec<Area>,
    pub blocks: Vec<Block>,
    /// Bumped whenever the area whose blocks are wanted changes.
    pub blocks_generation: u64,
    pub draft: Option<SiteDraft>,
    /// Detail generation the in-flight save was started under. A save only
    /// blocks further saves while that same detail is open.
    pub saving: Option<u64>,
}

impl WorkflowState {
    pub fn phase(&self) -> Phase {
        match (&self.selection, &self.detail) {
            (None, _) => Phase::Idle,
            (Some(_), Some(_)) => Phase::DetailReady,
            (Some(_), None) if self.detail_failed => Phase::DetailFailed,
            (Some(_), None) => Phase::DetailLoading,
        }
    }

    /// Select `id` and return the generation its detail response must carry.
    pub fn begin_open(&mut self, id: &ReviewId) -> u64 {
        self.selection = Some(id.clone());
        self.detail = None;
        self.detail_failed = false;
        self.error = None;
        self.exit_edit();
        self.detail_generation += 1;
        self.detail_generation
    }

    pub fn close_detail(&mut self) {
        self.selection = None;
        self.detail = None;
        self.detail_failed = false;
        self.exit_edit();
        self.detail_generation += 1;
    }

    pub fn is_saving(&self) -> bool {
        self.saving == Some(self.detail_generation)
    }

    /// Clear the save marker unless a newer save has taken its place.
    pub fn finish_save(&mut self, generation: u64) {
        if self.saving == Some(generation) {
            self.saving = None;
        }
    }

    /// Drop the draft and the area-scoped block list. Areas stay cached.
    pub fn exit_edit(&mut self) {
        self.draft = None;
        self.blocks.clear();
        self.blocks_generation += 1;
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        WorkflowSnapshot {
            phase: self.phase(),
            queue: self.queue.clone(),
            selection: self.selection.clone(),
            detail: self.detail.clone(),
            pending_decision: self.pending_decision.clone(),
            error: self.error.clone(),
            draft: self.draft.clone(),
            areas: self.areas.clone(),
            blocks: self.blocks.clone(),
            saving: self.is_saving(),
        }
    }
}

/// Point-in-time copy of the controller state for rendering.
#[derive(Debug, Clone)]
pub struct WorkflowSnapshot {
    pub phase: Phase,
    pub queue: Vec<ReviewItem>,
    pub selection: Option<ReviewId>,
    pub detail: Option<ReviewDetail>,
    pub pending_decision: Option<ReviewId>,
    pub error: Option<String>,
    pub draft: Option<SiteDraft>,
    pub areas: Vec<Area>,
    pub blocks: Vec<Block>,
    pub saving: bool,
}

impl WorkflowSnapshot {
    pub fn is_editing(&self) -> bool {
        self.draft.is_some()
    }

    /// Pending / under-review items in queue order.
    pub fn open_items(&self) -> impl Iterator<Item = &ReviewItem> {
        self.queue.iter().filter(|item| item.is_open())
    }
}
