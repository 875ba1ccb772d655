//! HTTP client for the backend gateway.
//!
//! Every call goes through [`GatewayClient::execute`], which attaches the
//! session's bearer token and maps the response onto [`GatewayError`]:
//! non-JSON bodies become their raw text, non-2xx JSON bodies surface their
//! `message`/`error` field, and a 401 clears the session.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;

use reviewdesk_core::approval::Decision;
use reviewdesk_core::site_edit::SiteUpdate;
use reviewdesk_core::time_range::TimeRange;
use reviewdesk_core::types::{Area, AreaId, Block, ReviewDetail, ReviewId, ReviewItem};

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::gateway::ReviewGateway;
use crate::routes;
use crate::session::SessionStore;
use crate::types::{
    ApiEnvelope, AreaList, BlockList, DashboardOverview, DecisionReceipt, LoginData,
    LoginRequest, QueueFilter, StatusOnly,
};

/// HTTP client for a single gateway deployment.
pub struct GatewayClient {
    client: reqwest::Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
}

impl GatewayClient {
    /// Create a client with its own connection pool and request timeout.
    pub fn new(config: &GatewayConfig, session: Arc<dyn SessionStore>) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self::with_client(client, config.base_url.clone(), session))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        base_url: String,
        session: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Authenticate and store the returned token and profile.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginData, GatewayError> {
        tracing::info!(username, "Logging in");

        let request = self
            .client
            .post(self.endpoint(routes::LOGIN)?)
            .json(&LoginRequest { username, password });

        let data: LoginData = self
            .execute::<LoginData>(request)
            .await?
            .into_data("Login failed")?;

        self.session.set(&data.token, &data.employee)?;
        tracing::info!(employee_id = %data.employee.id, role = %data.role, "Logged in");
        Ok(data)
    }

    /// Tell the gateway the session is over, then clear it locally.
    ///
    /// Gateway errors are logged and swallowed; the local session is
    /// cleared regardless.
    pub async fn logout(&self) {
        let result = match self.endpoint(routes::LOGOUT) {
            Ok(url) => self.execute::<StatusOnly>(self.client.post(url)).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(_) => tracing::info!("Logged out"),
            Err(e) => tracing::warn!(error = %e, "Logout call failed, clearing session anyway"),
        }
        if let Err(e) = self.session.clear() {
            tracing::error!(error = %e, "Failed to clear session");
        }
    }

    /// Fetch the aggregate dashboard KPIs for a time range.
    pub async fn overview(&self, range: &TimeRange) -> Result<DashboardOverview, GatewayError> {
        let request = self
            .client
            .get(self.endpoint(routes::OVERVIEW)?)
            .query(&range.query_params());
        self.execute::<DashboardOverview>(request)
            .await?
            .into_data("Failed to load dashboard overview")
    }

    // ---- private helpers ----

    /// Append `segments` to the base URL, percent-encoding each one.
    fn endpoint<I>(&self, segments: I) -> Result<Url, GatewayError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| GatewayError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| GatewayError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Attach the bearer token, send, and decode the response envelope.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<ApiEnvelope<T>, GatewayError> {
        let request = match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        self.parse_envelope(response).await
    }

    async fn parse_envelope<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<ApiEnvelope<T>, GatewayError> {
        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));

        if !is_json {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                http_fallback(status)
            } else {
                body
            };
            tracing::warn!(status = status.as_u16(), "Gateway returned a non-JSON response");
            if status == StatusCode::UNAUTHORIZED {
                return Err(self.unauthorized(message));
            }
            return Err(GatewayError::NonJson {
                status: status.as_u16(),
                body: message,
            });
        }

        let body: serde_json::Value = response.json().await?;

        if !status.is_success() {
            let message = error_message(&body).unwrap_or_else(|| http_fallback(status));
            if status == StatusCode::UNAUTHORIZED {
                return Err(self.unauthorized(message));
            }
            tracing::warn!(status = status.as_u16(), message = %message, "Gateway error response");
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_value(body)?)
    }

    fn unauthorized(&self, message: String) -> GatewayError {
        tracing::warn!(message = %message, "Gateway rejected credentials, clearing session");
        if let Err(e) = self.session.clear() {
            tracing::error!(error = %e, "Failed to clear session");
        }
        GatewayError::Unauthorized(message)
    }
}

/// `message`, then `error`, from a JSON error body.
fn error_message(body: &serde_json::Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .filter_map(|key| body.get(key).and_then(|v| v.as_str()))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn http_fallback(status: StatusCode) -> String {
    format!(
        "HTTP {}: {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    )
}

#[async_trait]
impl ReviewGateway for GatewayClient {
    async fn pending_reviews(&self, filter: &QueueFilter) -> Result<Vec<ReviewItem>, GatewayError> {
        let request = self
            .client
            .get(self.endpoint(routes::PENDING_REVIEWS)?)
            .query(&filter.query_params());
        let items: Vec<ReviewItem> = self
            .execute::<Vec<ReviewItem>>(request)
            .await?
            .into_data("Failed to load site registrations")?;
        tracing::debug!(count = items.len(), "Fetched pending reviews");
        Ok(items)
    }

    async fn review_detail(&self, id: &ReviewId) -> Result<ReviewDetail, GatewayError> {
        let request = self.client.get(self.endpoint(routes::review(id.as_str()))?);
        self.execute::<ReviewDetail>(request)
            .await?
            .into_data("Failed to load review details")
    }

    async fn submit_decision(
        &self,
        id: &ReviewId,
        decision: &Decision,
    ) -> Result<DecisionReceipt, GatewayError> {
        let request = self
            .client
            .post(self.endpoint(routes::review_action(id.as_str()))?)
            .json(&decision.to_request());
        let receipt: DecisionReceipt = self
            .execute::<DecisionReceipt>(request)
            .await?
            .into_data("Failed to submit review decision")?;
        tracing::info!(
            review_id = %id,
            action = decision.outcome().action(),
            status = %receipt.status,
            "Decision recorded"
        );
        Ok(receipt)
    }

    async fn update_site(
        &self,
        site_id: &str,
        update: &SiteUpdate,
    ) -> Result<serde_json::Value, GatewayError> {
        let request = self
            .client
            .put(self.endpoint(routes::update_site(site_id))?)
            .json(update);
        self.execute::<serde_json::Value>(request)
            .await?
            .into_data("Failed to update site details")
    }

    async fn areas(&self) -> Result<Vec<Area>, GatewayError> {
        let request = self.client.get(self.endpoint(routes::AREAS)?);
        let list: AreaList = self
            .execute::<AreaList>(request)
            .await?
            .into_data("Failed to load areas")?;
        Ok(list.areas)
    }

    async fn blocks(&self, area_id: AreaId) -> Result<Vec<Block>, GatewayError> {
        let request = self.client.get(self.endpoint(routes::area_blocks(&area_id.to_string()))?);
        let list: BlockList = self
            .execute::<BlockList>(request)
            .await?
            .into_data("Failed to load blocks")?;
        Ok(list.blocks)
    }
}
