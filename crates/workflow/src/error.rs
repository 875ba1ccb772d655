use reviewdesk_core::error::CoreError;
use reviewdesk_core::types::ReviewId;
use reviewdesk_gateway::GatewayError;

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// Validation failed before any gateway call.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Review {0} is not in the current queue")]
    NotInQueue(ReviewId),

    #[error("No review detail is loaded")]
    NoDetail,

    #[error("Not editing a site")]
    NotEditing,

    /// The selection moved while an edit was being prepared.
    #[error("The open review changed, try again")]
    SelectionChanged,

    #[error("A save is already in progress")]
    SaveInProgress,
}

impl WorkflowError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Gateway(e) if e.is_unauthorized())
    }
}
