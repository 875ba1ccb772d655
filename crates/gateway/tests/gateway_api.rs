//! Integration tests for the gateway client against an in-process fake
//! backend.

mod common;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use reviewdesk_core::approval::Decision;
use reviewdesk_core::site_edit::SiteUpdate;
use reviewdesk_core::time_range::TimeRange;
use reviewdesk_core::types::{ReviewId, ReviewStatus};
use reviewdesk_gateway::types::QueueFilter;
use reviewdesk_gateway::{GatewayError, MemorySessionStore, ReviewGateway, SessionStore};

use common::{
    client, logged_in_session, operator_json, review_detail_json, review_item_json,
    spawn_gateway,
};

type Captured = Arc<Mutex<Option<Value>>>;

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Login / logout
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_stores_token_and_profile() {
    let captured: Captured = Arc::default();
    let sink = captured.clone();
    let app = Router::new().route(
        "/employee/login",
        post(move |Json(body): Json<Value>| {
            let sink = sink.clone();
            async move {
                *sink.lock().unwrap() = Some(body);
                Json(json!({
                    "success": true,
                    "data": { "token": "tok-new", "role": "REVIEWER", "employee": operator_json() }
                }))
            }
        }),
    );
    let base = spawn_gateway(app).await;
    let session = Arc::new(MemorySessionStore::new());
    let gateway = client(&base, session.clone());

    let data = gateway.login("sara", "s3cret").await.unwrap();

    assert_eq!(data.role, "REVIEWER");
    assert_eq!(session.token().as_deref(), Some("tok-new"));
    assert_eq!(session.user().unwrap().full_name, "Sara Reviewer");
    let body = captured.lock().unwrap().clone().unwrap();
    assert_eq!(body, json!({"username": "sara", "password": "s3cret"}));
}

#[tokio::test]
async fn failed_login_leaves_session_empty() {
    let app = Router::new().route(
        "/employee/login",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"success": false, "error": "Invalid credentials"})),
            )
        }),
    );
    let base = spawn_gateway(app).await;
    let session = Arc::new(MemorySessionStore::new());
    let gateway = client(&base, session.clone());

    let err = gateway.login("sara", "wrong").await.unwrap_err();

    assert_matches!(err, GatewayError::Api { status: 400, ref message } if message == "Invalid credentials");
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn logout_clears_session_even_when_gateway_fails() {
    let app = Router::new().route(
        "/employee/logout",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let base = spawn_gateway(app).await;
    let session = logged_in_session();
    let gateway = client(&base, session.clone());

    gateway.logout().await;

    assert!(!session.is_authenticated());
}

// ---------------------------------------------------------------------------
// Queue and detail
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pending_reviews_send_bearer_and_filters() {
    let seen: Arc<Mutex<Option<(Option<String>, HashMap<String, String>)>>> = Arc::default();
    let sink = seen.clone();
    let app = Router::new().route(
        "/employee/site-reviews/pending-reviews",
        get(
            move |headers: HeaderMap, Query(params): Query<HashMap<String, String>>| {
                let sink = sink.clone();
                async move {
                    *sink.lock().unwrap() = Some((bearer(&headers), params));
                    Json(json!({
                        "success": true,
                        "data": [
                            review_item_json("x", "PENDING_REVIEW"),
                            review_item_json("y", "UNDER_REVIEW")
                        ]
                    }))
                }
            },
        ),
    );
    let base = spawn_gateway(app).await;
    let gateway = client(&base, logged_in_session());
    let today = chrono::NaiveDate::from_ymd_opt(2024, 1, 18).unwrap();
    let filter = QueueFilter {
        page: Some(1),
        limit: Some(100),
        dates: Some(TimeRange::Weekly.resolve(today)),
    };

    let items = gateway.pending_reviews(&filter).await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[1].status, ReviewStatus::UnderReview);
    let (auth, params) = seen.lock().unwrap().clone().unwrap();
    assert_eq!(auth.as_deref(), Some("Bearer tok-abc"));
    assert_eq!(params["page"], "1");
    assert_eq!(params["limit"], "100");
    assert_eq!(params["startDate"], "2024-01-15");
    assert_eq!(params["endDate"], "2024-01-18");
}

#[tokio::test]
async fn review_detail_parses_site_and_documents() {
    let app = Router::new().route(
        "/employee/site-reviews/review/{id}",
        get(|Path(id): Path<String>| async move {
            Json(json!({"success": true, "data": review_detail_json(&id)}))
        }),
    );
    let base = spawn_gateway(app).await;
    let gateway = client(&base, logged_in_session());

    let detail = gateway.review_detail(&ReviewId::from("rv-7")).await.unwrap();

    assert_eq!(detail.id, ReviewId::from("rv-7"));
    assert_eq!(detail.site_id, "site-rv-7");
    assert_eq!(detail.site.area_id, 1);
    assert_eq!(detail.documents.len(), 2);
    assert!(detail.documents[1].image_data.is_none());
}

#[tokio::test]
async fn review_ids_stay_in_their_path_segment() {
    let app = Router::new().route(
        "/employee/site-reviews/review/{id}",
        get(|Path(id): Path<String>| async move {
            Json(json!({"success": true, "data": review_detail_json(&id)}))
        }),
    );
    let base = spawn_gateway(app).await;
    let gateway = client(&base, logged_in_session());

    let detail = gateway
        .review_detail(&ReviewId::from("rv/8?x=1#top"))
        .await
        .unwrap();

    assert_eq!(detail.id, ReviewId::from("rv/8?x=1#top"));
}

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unauthorized_response_clears_session() {
    let app = Router::new().route(
        "/employee/site-reviews/pending-reviews",
        get(|| async {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({"success": false, "message": "Token expired"})),
            )
        }),
    );
    let base = spawn_gateway(app).await;
    let session = logged_in_session();
    let gateway = client(&base, session.clone());

    let err = gateway
        .pending_reviews(&QueueFilter::default())
        .await
        .unwrap_err();

    assert_matches!(err, GatewayError::Unauthorized(ref msg) if msg == "Token expired");
    assert!(err.is_unauthorized());
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn non_json_error_uses_raw_text() {
    let app = Router::new().route(
        "/employee/site-reviews/review/{id}",
        get(|| async { (StatusCode::BAD_GATEWAY, "upstream unavailable") }),
    );
    let base = spawn_gateway(app).await;
    let gateway = client(&base, logged_in_session());

    let err = gateway
        .review_detail(&ReviewId::from("rv-1"))
        .await
        .unwrap_err();

    assert_matches!(err, GatewayError::NonJson { status: 502, .. });
    assert_eq!(err.to_string(), "upstream unavailable");
}

#[tokio::test]
async fn json_error_surfaces_message() {
    let app = Router::new().route(
        "/employee/site-reviews/review/{id}",
        get(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({"success": false, "message": "Review not found"})),
            )
        }),
    );
    let base = spawn_gateway(app).await;
    let gateway = client(&base, logged_in_session());

    let err = gateway
        .review_detail(&ReviewId::from("missing"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "Review not found");
}

#[tokio::test]
async fn json_error_without_message_uses_status_line() {
    let app = Router::new().route(
        "/employee/areas",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, Json(json!({}))) }),
    );
    let base = spawn_gateway(app).await;
    let gateway = client(&base, logged_in_session());

    let err = gateway.areas().await.unwrap_err();

    assert_eq!(err.to_string(), "HTTP 503: Service Unavailable");
}

#[tokio::test]
async fn unsuccessful_envelope_is_an_error() {
    let app = Router::new().route(
        "/employee/site-reviews/review/{id}",
        get(|| async { Json(json!({"success": false, "message": "Review is locked"})) }),
    );
    let base = spawn_gateway(app).await;
    let gateway = client(&base, logged_in_session());

    let err = gateway
        .review_detail(&ReviewId::from("rv-1"))
        .await
        .unwrap_err();

    assert_matches!(err, GatewayError::Unsuccessful(ref msg) if msg == "Review is locked");
}

#[tokio::test]
async fn unreachable_gateway_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let gateway = client(&format!("http://{addr}"), logged_in_session());

    let err = gateway.areas().await.unwrap_err();

    assert_matches!(err, GatewayError::Network(_));
}

// ---------------------------------------------------------------------------
// Decisions and edits
// ---------------------------------------------------------------------------

#[tokio::test]
async fn decision_posts_action_and_notes() {
    let captured: Captured = Arc::default();
    let sink = captured.clone();
    let app = Router::new().route(
        "/employee/site-reviews/review/{id}/action",
        post(move |Path(id): Path<String>, Json(body): Json<Value>| {
            let sink = sink.clone();
            async move {
                *sink.lock().unwrap() = Some(json!({"id": id, "body": body}));
                Json(json!({"success": true, "data": {"status": "REJECTED"}}))
            }
        }),
    );
    let base = spawn_gateway(app).await;
    let gateway = client(&base, logged_in_session());
    let decision = Decision::reject("Incomplete Documentation").unwrap();

    let receipt = gateway
        .submit_decision(&ReviewId::from("rv-3"), &decision)
        .await
        .unwrap();

    assert_eq!(receipt.status, ReviewStatus::Rejected);
    let seen = captured.lock().unwrap().clone().unwrap();
    assert_eq!(seen["id"], "rv-3");
    assert_eq!(
        seen["body"],
        json!({"action": "reject", "notes": "Incomplete Documentation"})
    );
}

#[tokio::test]
async fn update_site_sends_only_changed_fields() {
    let captured: Captured = Arc::default();
    let sink = captured.clone();
    let app = Router::new().route(
        "/employee/site-reviews/site/{site_id}/update-details",
        put(move |Path(site_id): Path<String>, Json(body): Json<Value>| {
            let sink = sink.clone();
            async move {
                *sink.lock().unwrap() = Some(body.clone());
                Json(json!({"success": true, "data": {"id": site_id, "blockId": body["blockId"]}}))
            }
        }),
    );
    let base = spawn_gateway(app).await;
    let gateway = client(&base, logged_in_session());
    let update = SiteUpdate {
        area_id: None,
        block_id: Some(11),
    };

    let record = gateway.update_site("site-9", &update).await.unwrap();

    assert_eq!(record["id"], "site-9");
    assert_eq!(captured.lock().unwrap().clone().unwrap(), json!({"blockId": 11}));
}

#[tokio::test]
async fn areas_and_blocks_unwrap_nested_lists() {
    let app = Router::new()
        .route(
            "/employee/areas",
            get(|| async {
                Json(json!({"success": true, "data": {"areas": [
                    {"id": 1, "name": "Clifton"},
                    {"id": 2, "name": "DHA"}
                ]}}))
            }),
        )
        .route(
            "/employee/areas/{id}/blocks",
            get(|Path(id): Path<i64>| async move {
                Json(json!({"success": true, "data": {"blocks": [
                    {"id": id * 10, "name": "Block A", "areaId": id}
                ]}}))
            }),
        );
    let base = spawn_gateway(app).await;
    let gateway = client(&base, logged_in_session());

    let areas = gateway.areas().await.unwrap();
    let blocks = gateway.blocks(2).await.unwrap();

    assert_eq!(areas.len(), 2);
    assert_eq!(blocks[0].id, 20);
    assert_eq!(blocks[0].area_id, 2);
}

#[tokio::test]
async fn overview_sends_time_range() {
    let app = Router::new().route(
        "/employee/dashboard/overview",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            Json(json!({"success": true, "data": {
                "timeRange": params.get("timeRange"),
                "startDate": params.get("startDate"),
                "pendingReviews": 12
            }}))
        }),
    );
    let base = spawn_gateway(app).await;
    let gateway = client(&base, logged_in_session());
    let range: TimeRange = "2024-01-01..2024-01-31".parse().unwrap();

    let overview = gateway.overview(&range).await.unwrap();

    assert_eq!(overview.metric("timeRange"), Some(&json!("custom")));
    assert_eq!(overview.metric("startDate"), Some(&json!("2024-01-01")));
    assert_eq!(overview.metric("pendingReviews"), Some(&json!(12)));
}
