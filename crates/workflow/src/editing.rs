//! Area/block reassignment of the site behind the open review.

use tokio::task::JoinHandle;

use reviewdesk_core::error::CoreError;
use reviewdesk_core::site_edit::{SiteDraft, SiteUpdate};
use reviewdesk_core::types::{AreaId, BlockId, ReviewId};
use reviewdesk_gateway::ReviewGateway;

use crate::controller::ReviewWorkflow;
use crate::error::WorkflowError;

const AREAS_FAILED: &str = "Failed to load areas. Please try again.";
const BLOCKS_FAILED: &str = "Failed to load blocks. Please try again.";

/// Review id, site id, detail generation and the changes to submit.
type PreparedSave = (ReviewId, String, u64, SiteUpdate);

/// Result of [`ReviewWorkflow::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Nothing changed; edit mode was left without calling the gateway.
    Unchanged,
    /// The gateway accepted these changes.
    Saved { update: SiteUpdate },
}

impl<G: ReviewGateway> ReviewWorkflow<G> {
    /// Fetch the area catalog into the cache. Failures are logged, not
    /// reported.
    pub async fn load_areas(&self) -> Result<usize, WorkflowError> {
        match self.gateway().areas().await {
            Ok(areas) => {
                let count = areas.len();
                self.lock().areas = areas;
                tracing::debug!(count, "Area catalog loaded");
                Ok(count)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load areas");
                Err(e.into())
            }
        }
    }

    /// Enter edit mode for the loaded detail.
    ///
    /// Loads the area catalog first when the cache is empty. Returns the
    /// handle of the block fetch for the site's current area, if it has one.
    pub async fn begin_edit(&self) -> Result<Option<JoinHandle<()>>, WorkflowError> {
        let (generation, need_areas) = self.reported(self.edit_target())?;

        if need_areas {
            if let Err(e) = self.load_areas().await {
                self.surface(AREAS_FAILED.to_string(), e.is_unauthorized());
                return Err(e);
            }
        }

        let current_area = self.reported(self.start_draft(generation))?;
        Ok(current_area.map(|(area_id, blocks_generation)| {
            self.spawn_blocks_fetch(area_id, blocks_generation)
        }))
    }

    /// Pick a new area. Clears the block selection and fetches the area's
    /// blocks; a response for an area that is no longer selected is dropped.
    pub fn select_area(&self, area_id: AreaId) -> Result<JoinHandle<()>, WorkflowError> {
        let blocks_generation = self.reported(self.draft_area(area_id))?;
        Ok(self.spawn_blocks_fetch(area_id, blocks_generation))
    }

    /// Pick a block from the loaded list for the selected area.
    pub fn select_block(&self, block_id: BlockId) -> Result<(), WorkflowError> {
        self.reported(self.draft_block(block_id))
    }

    pub fn cancel_edit(&self) {
        self.lock().exit_edit();
    }

    /// Submit the changed fields of the draft.
    ///
    /// An empty diff leaves edit mode without a gateway call. After a
    /// successful update the detail and the queue are refetched; a failed
    /// detail refetch is only logged. A failed update keeps edit mode so
    /// the operator can retry.
    pub async fn save(&self) -> Result<SaveOutcome, WorkflowError> {
        let (id, site_id, generation, update) = match self.reported(self.prepare_save())? {
            Some(prepared) => prepared,
            None => return Ok(SaveOutcome::Unchanged),
        };

        tracing::info!(
            review_id = %id,
            site_id = %site_id,
            area_id = ?update.area_id,
            block_id = ?update.block_id,
            "Updating site assignment"
        );

        if let Err(e) = self.gateway().update_site(&site_id, &update).await {
            self.lock().finish_save(generation);
            return self.reported(Err(e.into()));
        }

        match self.gateway().review_detail(&id).await {
            Ok(detail) => {
                let mut state = self.lock();
                if state.detail_generation == generation && detail.id == id {
                    state.detail = Some(detail);
                }
            }
            Err(e) => {
                tracing::warn!(review_id = %id, error = %e, "Failed to refetch review after update");
            }
        }

        // Errors are reported by reload itself.
        let _ = self.reload().await;

        let mut state = self.lock();
        state.finish_save(generation);
        if state.detail_generation == generation {
            state.exit_edit();
        }
        Ok(SaveOutcome::Saved { update })
    }

    // ---- state transitions ----

    fn edit_target(&self) -> Result<(u64, bool), WorkflowError> {
        let state = self.lock();
        if state.detail.is_none() {
            return Err(WorkflowError::NoDetail);
        }
        Ok((state.detail_generation, state.areas.is_empty()))
    }

    /// Seed the draft from the detail loaded at `generation`. Returns the
    /// site's area and the blocks generation to fetch it under.
    fn start_draft(&self, generation: u64) -> Result<Option<(AreaId, u64)>, WorkflowError> {
        let mut state = self.lock();
        if state.detail_generation != generation {
            return Err(WorkflowError::SelectionChanged);
        }
        let draft = match &state.detail {
            Some(detail) => SiteDraft::from_site(&detail.site),
            None => return Err(WorkflowError::NoDetail),
        };
        let area_id = draft.area().map(|a| a.id).filter(|id| *id != 0);
        state.draft = Some(draft);
        state.blocks.clear();
        state.blocks_generation += 1;
        Ok(area_id.map(|id| (id, state.blocks_generation)))
    }

    fn draft_area(&self, area_id: AreaId) -> Result<u64, WorkflowError> {
        let mut state = self.lock();
        let area = state
            .areas
            .iter()
            .find(|a| a.id == area_id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound {
                entity: "area",
                id: area_id.to_string(),
            })?;
        let draft = state.draft.as_mut().ok_or(WorkflowError::NotEditing)?;
        draft.select_area(area);
        state.blocks.clear();
        state.blocks_generation += 1;
        Ok(state.blocks_generation)
    }

    fn draft_block(&self, block_id: BlockId) -> Result<(), WorkflowError> {
        let mut state = self.lock();
        let block = state
            .blocks
            .iter()
            .find(|b| b.id == block_id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound {
                entity: "block",
                id: block_id.to_string(),
            })?;
        let draft = state.draft.as_mut().ok_or(WorkflowError::NotEditing)?;
        draft.select_block(block)?;
        Ok(())
    }

    /// Mark a save as started. `None` when the draft has no changes, in
    /// which case edit mode has already been left.
    fn prepare_save(&self) -> Result<Option<PreparedSave>, WorkflowError> {
        let mut state = self.lock();
        if state.is_saving() {
            return Err(WorkflowError::SaveInProgress);
        }
        let update = match &state.draft {
            Some(draft) => draft.diff(),
            None => return Err(WorkflowError::NotEditing),
        };
        if update.is_empty() {
            state.exit_edit();
            return Ok(None);
        }
        let (id, site_id) = match (&state.selection, &state.detail) {
            (Some(id), Some(detail)) => (id.clone(), detail.site_id.clone()),
            _ => return Err(WorkflowError::NoDetail),
        };
        state.saving = Some(state.detail_generation);
        Ok(Some((id, site_id, state.detail_generation, update)))
    }

    fn spawn_blocks_fetch(&self, area_id: AreaId, blocks_generation: u64) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            let result = this.gateway().blocks(area_id).await;

            let failure = {
                let mut state = this.lock();
                if state.blocks_generation != blocks_generation || state.draft.is_none() {
                    tracing::debug!(area_id, "Discarding stale blocks response");
                    return;
                }
                match result {
                    Ok(blocks) => {
                        state.blocks = blocks;
                        None
                    }
                    Err(e) => Some(e),
                }
            };

            if let Some(e) = failure {
                tracing::warn!(area_id, error = %e, "Failed to load blocks");
                this.surface(BLOCKS_FAILED.to_string(), e.is_unauthorized());
            }
        })
    }
}
