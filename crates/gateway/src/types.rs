//! Request and response shapes specific to the gateway wire format.

use serde::{Deserialize, Serialize};

use reviewdesk_core::time_range::DateRange;
use reviewdesk_core::types::{Area, AuthUser, Block, ReviewStatus};

use crate::error::GatewayError;

/// `{success, data, message?, error?}` envelope wrapping every response.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Unwrap the payload, turning `success: false` or a missing `data`
    /// into [`GatewayError::Unsuccessful`] with the best available message.
    pub fn into_data(self, fallback: &str) -> Result<T, GatewayError> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(GatewayError::Unsuccessful(
                self.message
                    .or(self.error)
                    .unwrap_or_else(|| fallback.to_string()),
            )),
        }
    }
}

/// Envelope whose `data` is irrelevant (logout).
#[derive(Debug, Deserialize)]
pub struct StatusOnly {
    #[serde(default)]
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Payload of a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    pub token: String,
    pub role: String,
    pub employee: AuthUser,
}

/// Optional filters for the pending-reviews listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueFilter {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub dates: Option<DateRange>,
}

impl QueueFilter {
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(dates) = &self.dates {
            params.extend(dates.query_params());
        }
        params
    }
}

/// Result of a decision call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DecisionReceipt {
    pub status: ReviewStatus,
}

#[derive(Debug, Deserialize)]
pub struct AreaList {
    pub areas: Vec<Area>,
}

#[derive(Debug, Deserialize)]
pub struct BlockList {
    pub blocks: Vec<Block>,
}

/// Aggregate KPI object from the dashboard overview endpoint. The shape is
/// owned by the gateway and only displayed, so it is kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct DashboardOverview(pub serde_json::Map<String, serde_json::Value>);

impl DashboardOverview {
    pub fn metric(&self, name: &str) -> Option<&serde_json::Value> {
        self.0.get(name)
    }
}
