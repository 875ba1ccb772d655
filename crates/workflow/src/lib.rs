//! Review workflow controller.
//!
//! [`ReviewWorkflow`] holds the review queue snapshot, the open selection
//! and its detail, and drives the open / decide / advance loop. Decisions
//! advance the operator to the next pending item immediately; the gateway
//! call and the queue refresh run as a detached background chain whose
//! failures are reported to the error slot and the [`WorkflowEvent`]
//! stream without undoing the advancement.

pub mod controller;
pub mod editing;
pub mod error;
pub mod events;
pub mod state;

pub use controller::{next_pending, DecisionHandle, ReviewWorkflow};
pub use editing::SaveOutcome;
pub use error::WorkflowError;
pub use events::WorkflowEvent;
pub use state::{Phase, WorkflowSnapshot};
