//! Decision constants and validation for review approval/rejection.
//!
//! A [`Decision`] is validated before any gateway call is made: rejections
//! must carry a non-empty reason, approvals fall back to a fixed note.

use serde::Serialize;

use crate::error::CoreError;

/// Wire value for an approval.
pub const ACTION_APPROVE: &str = "approve";

/// Wire value for a rejection.
pub const ACTION_REJECT: &str = "reject";

/// Note sent with an approval when the reviewer supplies none.
pub const DEFAULT_APPROVAL_NOTE: &str = "All documents verified. Site approved.";

/// Preset rejection reasons offered to the reviewer. Free-text reasons are
/// also accepted.
pub const REJECTION_REASONS: &[&str] = &[
    "Incomplete Documentation",
    "Incorrect Information",
    "Quality Standards Not Met",
    "Policy Violation",
    "Duplicate Request",
];

/// The two possible outcomes of a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Approve,
    Reject,
}

impl Outcome {
    pub fn action(self) -> &'static str {
        match self {
            Self::Approve => ACTION_APPROVE,
            Self::Reject => ACTION_REJECT,
        }
    }
}

/// A validated decision, ready to be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    outcome: Outcome,
    notes: String,
}

impl Decision {
    /// Build a decision, validating the reason for rejections.
    ///
    /// Approvals use `reason` as the note when it is non-blank, otherwise
    /// [`DEFAULT_APPROVAL_NOTE`]. Rejections require a non-blank reason,
    /// which is trimmed.
    pub fn new(outcome: Outcome, reason: Option<&str>) -> Result<Self, CoreError> {
        let trimmed = reason.map(str::trim).filter(|r| !r.is_empty());
        match outcome {
            Outcome::Approve => Ok(Self {
                outcome,
                notes: trimmed.unwrap_or(DEFAULT_APPROVAL_NOTE).to_string(),
            }),
            Outcome::Reject => match trimmed {
                Some(reason) => Ok(Self {
                    outcome,
                    notes: reason.to_string(),
                }),
                None => Err(CoreError::Validation(
                    "Please provide a reason for rejection".to_string(),
                )),
            },
        }
    }

    pub fn reject(reason: &str) -> Result<Self, CoreError> {
        Self::new(Outcome::Reject, Some(reason))
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Request body for the gateway's review action endpoint.
    pub fn to_request(&self) -> DecisionRequest<'_> {
        DecisionRequest {
            action: self.outcome.action(),
            notes: &self.notes,
        }
    }
}

/// `{action, notes}` body of the review action call.
#[derive(Debug, Serialize)]
pub struct DecisionRequest<'a> {
    pub action: &'static str,
    pub notes: &'a str,
}
