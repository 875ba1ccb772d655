//! The gateway seam used by the workflow controller.

use async_trait::async_trait;

use reviewdesk_core::approval::Decision;
use reviewdesk_core::site_edit::SiteUpdate;
use reviewdesk_core::types::{Area, AreaId, Block, ReviewDetail, ReviewId, ReviewItem};

use crate::error::GatewayError;
use crate::types::{DecisionReceipt, QueueFilter};

/// Review operations the workflow controller needs from the backend.
///
/// Implemented by [`GatewayClient`](crate::GatewayClient) over HTTP.
#[async_trait]
pub trait ReviewGateway: Send + Sync + 'static {
    /// Current pending / under-review items, in server order.
    async fn pending_reviews(&self, filter: &QueueFilter) -> Result<Vec<ReviewItem>, GatewayError>;

    async fn review_detail(&self, id: &ReviewId) -> Result<ReviewDetail, GatewayError>;

    async fn submit_decision(
        &self,
        id: &ReviewId,
        decision: &Decision,
    ) -> Result<DecisionReceipt, GatewayError>;

    /// Update a site's editable fields. Returns the updated record as-is.
    async fn update_site(
        &self,
        site_id: &str,
        update: &SiteUpdate,
    ) -> Result<serde_json::Value, GatewayError>;

    async fn areas(&self) -> Result<Vec<Area>, GatewayError>;

    async fn blocks(&self, area_id: AreaId) -> Result<Vec<Block>, GatewayError>;
}
