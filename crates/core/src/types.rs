//! Records exchanged with the backend gateway.
//!
//! Field names follow the gateway's camelCase JSON. Status and priority
//! use the gateway's SCREAMING_SNAKE_CASE tags.

use std::fmt;

use serde::{Deserialize, Serialize};

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Area and block identifiers are gateway integers.
pub type AreaId = i64;
pub type BlockId = i64;

/// Opaque review identifier, unique within a queue snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(String);

impl ReviewId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReviewId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

// ---------------------------------------------------------------------------
// Status / priority
// ---------------------------------------------------------------------------

/// Server-authoritative review status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewStatus {
    PendingReview,
    UnderReview,
    Approved,
    Rejected,
}

impl ReviewStatus {
    /// Pending and under-review items are still awaiting a decision.
    pub fn is_open(self) -> bool {
        matches!(self, Self::PendingReview | Self::UnderReview)
    }

    /// Badge bucket used by list views: `approved`, `rejected` or `pending`.
    pub fn badge(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::PendingReview | Self::UnderReview => "pending",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PendingReview => "PENDING_REVIEW",
            Self::UnderReview => "UNDER_REVIEW",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Informational priority. Ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Normal,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Normal => "NORMAL",
            Self::High => "HIGH",
            Self::Urgent => "URGENT",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Review type tag for a manual verification request.
pub const REVIEW_TYPE_MANUAL_VERIFICATION: &str = "MANUAL_VERIFICATION";

/// Review type tag for a newly registered site.
pub const REVIEW_TYPE_NEW_SITE_VERIFICATION: &str = "NEW_SITE_VERIFICATION";

/// Human-readable label for a review type tag. Unknown tags pass through.
pub fn review_type_label(review_type: &str) -> &str {
    match review_type {
        REVIEW_TYPE_MANUAL_VERIFICATION => "Manual Verification",
        REVIEW_TYPE_NEW_SITE_VERIFICATION => "New Site Verification",
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Queue records
// ---------------------------------------------------------------------------

/// A unit of work in the review queue, as returned by the pending-reviews
/// listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
    pub id: ReviewId,
    #[serde(default)]
    pub site_id: Option<String>,
    pub status: ReviewStatus,
    pub priority: Priority,
    pub created_at: Timestamp,
    #[serde(default)]
    pub review_type: String,
    #[serde(default)]
    pub existing_site_id: Option<String>,
    #[serde(default)]
    pub created_by_user_name: String,
    #[serde(default)]
    pub full_address: String,
}

impl ReviewItem {
    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }
}

/// Site sub-record of a review detail. `area_id`/`block_id` are the
/// editable fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteInfo {
    pub area_id: AreaId,
    pub area_name: String,
    pub block_id: BlockId,
    pub block_name: String,
    #[serde(default)]
    pub house_no: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub nearest_landmark: Option<String>,
    #[serde(default)]
    pub additional_directions: Option<String>,
    #[serde(default)]
    pub pin_lat: Option<f64>,
    #[serde(default)]
    pub pin_lng: Option<f64>,
    #[serde(default)]
    pub pin_accuracy_m: Option<f64>,
    #[serde(default)]
    pub pin_captured_at: Option<String>,
    #[serde(default)]
    pub plot_key: Option<String>,
}

/// An attached document image, base64 encoded by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDocument {
    pub id: String,
    #[serde(default)]
    pub image_data: Option<String>,
}

/// Extended record for a single [`ReviewItem`], fetched on selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDetail {
    pub id: ReviewId,
    pub site_id: String,
    #[serde(default)]
    pub full_address: String,
    pub status: ReviewStatus,
    pub priority: Priority,
    pub created_at: Timestamp,
    #[serde(default)]
    pub created_by_user_name: String,
    #[serde(default)]
    pub created_by_consumer_no: Option<String>,
    #[serde(default)]
    pub created_by_user_type: String,
    pub site: SiteInfo,
    #[serde(default)]
    pub documents: Vec<ReviewDocument>,
}

// ---------------------------------------------------------------------------
// Catalog records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    pub id: AreaId,
    pub name: String,
}

/// Blocks are scoped to a single area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: BlockId,
    pub name: String,
    pub area_id: AreaId,
}

// ---------------------------------------------------------------------------
// Operator
// ---------------------------------------------------------------------------

/// Profile of the logged-in operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub status: String,
}
