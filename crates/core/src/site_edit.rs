//! Editable area/block assignment for a site under review.
//!
//! A [`SiteDraft`] starts from the loaded [`SiteInfo`], tracks the
//! reviewer's selection and produces a [`SiteUpdate`] holding only the
//! fields that actually changed.

use serde::Serialize;

use crate::error::CoreError;
use crate::types::{Area, AreaId, Block, BlockId, SiteInfo};

/// Body of the site update call. Unchanged fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_id: Option<AreaId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_id: Option<BlockId>,
}

impl SiteUpdate {
    pub fn is_empty(&self) -> bool {
        self.area_id.is_none() && self.block_id.is_none()
    }
}

/// Reviewer's in-progress edit of a site's area and block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteDraft {
    original_area_id: AreaId,
    original_block_id: BlockId,
    area: Option<Area>,
    block: Option<Block>,
}

impl SiteDraft {
    /// Seed the draft with the site's current assignment.
    pub fn from_site(site: &SiteInfo) -> Self {
        Self {
            original_area_id: site.area_id,
            original_block_id: site.block_id,
            area: Some(Area {
                id: site.area_id,
                name: site.area_name.clone(),
            }),
            block: Some(Block {
                id: site.block_id,
                name: site.block_name.clone(),
                area_id: site.area_id,
            }),
        }
    }

    pub fn area(&self) -> Option<&Area> {
        self.area.as_ref()
    }

    pub fn block(&self) -> Option<&Block> {
        self.block.as_ref()
    }

    /// Select a new area. Blocks are area-scoped, so the block selection
    /// is always cleared.
    pub fn select_area(&mut self, area: Area) {
        self.area = Some(area);
        self.block = None;
    }

    /// Select a block, which must belong to the selected area.
    pub fn select_block(&mut self, block: Block) -> Result<(), CoreError> {
        match &self.area {
            Some(area) if area.id == block.area_id => {
                self.block = Some(block);
                Ok(())
            }
            Some(area) => Err(CoreError::Validation(format!(
                "Block {} does not belong to area {}",
                block.name, area.name
            ))),
            None => Err(CoreError::Validation(
                "Select an area before choosing a block".to_string(),
            )),
        }
    }

    /// Fields that differ from the original assignment.
    ///
    /// An unset selection never produces a field, and neither does an id
    /// of `0`, which the gateway uses for "none".
    pub fn diff(&self) -> SiteUpdate {
        let changed = |selected: Option<i64>, original: i64| {
            selected.filter(|id| *id != 0 && *id != original)
        };
        SiteUpdate {
            area_id: changed(self.area.as_ref().map(|a| a.id), self.original_area_id),
            block_id: changed(self.block.as_ref().map(|b| b.id), self.original_block_id),
        }
    }
}
