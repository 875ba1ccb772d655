use std::sync::Arc;

use axum::Router;
use serde_json::{json, Value};

use reviewdesk_gateway::{GatewayClient, MemorySessionStore, SessionStore};

/// Serve `app` on an ephemeral localhost port and return its base URL.
pub async fn spawn_gateway(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake gateway");
    });
    format!("http://{addr}")
}

pub fn client(base_url: &str, session: Arc<MemorySessionStore>) -> GatewayClient {
    GatewayClient::with_client(reqwest::Client::new(), base_url.to_string(), session)
}

/// A session store already holding a token for `operator_json()`.
pub fn logged_in_session() -> Arc<MemorySessionStore> {
    let session = Arc::new(MemorySessionStore::new());
    session
        .set(
            "tok-abc",
            &serde_json::from_value(operator_json()).expect("operator"),
        )
        .expect("set session");
    session
}

pub fn operator_json() -> Value {
    json!({
        "id": "emp-1",
        "fullName": "Sara Reviewer",
        "email": "sara@example.com",
        "role": "REVIEWER",
        "status": "ACTIVE"
    })
}

pub fn review_item_json(id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "siteId": format!("site-{id}"),
        "status": status,
        "priority": "NORMAL",
        "createdAt": "2024-01-15T10:30:00Z",
        "reviewType": "NEW_SITE_VERIFICATION",
        "existingSiteId": null,
        "createdByUserName": "Ahmed Ali",
        "fullAddress": "House 45, Block 15"
    })
}

pub fn review_detail_json(id: &str) -> Value {
    json!({
        "id": id,
        "siteId": format!("site-{id}"),
        "fullAddress": "House 45, Block 15",
        "status": "PENDING_REVIEW",
        "priority": "HIGH",
        "createdAt": "2024-01-15T10:30:00Z",
        "createdByUserName": "Ahmed Ali",
        "createdByConsumerNo": null,
        "createdByUserType": "CONSUMER",
        "site": {
            "areaId": 1,
            "areaName": "Clifton",
            "blockId": 10,
            "blockName": "Block 9",
            "houseNo": "45",
            "pinLat": 24.81,
            "pinLng": 67.03
        },
        "documents": [
            { "id": "doc-1", "imageData": "aGVsbG8=" },
            { "id": "doc-2", "imageData": null }
        ]
    })
}
