//! Scriptable in-memory gateway for driving the workflow controller.
//!
//! Every call is recorded before it waits on its gate, so tests can assert
//! that a call was issued while its response is still held back.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::Notify;

use reviewdesk_core::approval::Decision;
use reviewdesk_core::site_edit::SiteUpdate;
use reviewdesk_core::types::{
    Area, AreaId, Block, Priority, ReviewDetail, ReviewId, ReviewItem, ReviewStatus, SiteInfo,
};
use reviewdesk_gateway::types::{DecisionReceipt, QueueFilter};
use reviewdesk_gateway::{GatewayError, ReviewGateway};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Queue,
    Detail(ReviewId),
    Decision {
        id: ReviewId,
        action: &'static str,
        notes: String,
    },
    UpdateSite {
        site_id: String,
        update: SiteUpdate,
    },
    Areas,
    Blocks(AreaId),
}

/// Canned failure, converted to a [`GatewayError`] when served.
#[derive(Debug, Clone)]
pub enum Fail {
    Server(&'static str),
    Unauthorized,
}

impl Fail {
    fn into_error(self) -> GatewayError {
        match self {
            Fail::Server(message) => GatewayError::Api {
                status: 500,
                message: message.to_string(),
            },
            Fail::Unauthorized => GatewayError::Unauthorized("Session expired".to_string()),
        }
    }
}

/// Holds a response back until released. Releasing before the call
/// arrives lets it through immediately.
#[derive(Clone, Default)]
pub struct Gate(Arc<Notify>);

impl Gate {
    pub fn release(&self) {
        self.0.notify_one();
    }

    async fn wait(&self) {
        self.0.notified().await;
    }
}

struct QueueReply {
    result: Result<Vec<ReviewItem>, Fail>,
    gate: Option<Gate>,
}

#[derive(Default)]
pub struct MockGateway {
    calls: Mutex<Vec<Call>>,
    queue_script: Mutex<VecDeque<QueueReply>>,
    queue_default: Mutex<Vec<ReviewItem>>,
    detail_gates: Mutex<HashMap<ReviewId, Gate>>,
    detail_failures: Mutex<HashMap<ReviewId, Fail>>,
    decision_gate: Mutex<Option<Gate>>,
    decision_failure: Mutex<Option<Fail>>,
    update_gate: Mutex<Option<Gate>>,
    update_failure: Mutex<Option<Fail>>,
    areas: Mutex<Vec<Area>>,
    areas_failure: Mutex<Option<Fail>>,
    blocks: Mutex<HashMap<AreaId, Vec<Block>>>,
    blocks_gates: Mutex<HashMap<AreaId, Gate>>,
}

impl MockGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn decision_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Decision { .. }))
            .collect()
    }

    pub fn count(&self, wanted: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| wanted(c)).count()
    }

    /// Poll until at least `n` calls match, failing the test after a second.
    pub async fn wait_for(&self, n: usize, wanted: impl Fn(&Call) -> bool) {
        let waited = tokio::time::timeout(Duration::from_secs(1), async {
            while self.count(&wanted) < n {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        assert!(waited.is_ok(), "timed out waiting for calls, saw {:?}", self.calls());
    }

    /// Response served once no scripted queue reply remains.
    pub fn set_queue(&self, items: Vec<ReviewItem>) {
        *self.queue_default.lock().unwrap() = items;
    }

    /// Script the next queue response, optionally held behind a gate.
    pub fn push_queue(&self, items: Vec<ReviewItem>, gate: Option<Gate>) {
        self.queue_script.lock().unwrap().push_back(QueueReply {
            result: Ok(items),
            gate,
        });
    }

    pub fn push_queue_failure(&self, fail: Fail) {
        self.queue_script.lock().unwrap().push_back(QueueReply {
            result: Err(fail),
            gate: None,
        });
    }

    pub fn gate_detail(&self, id: &str) -> Gate {
        let gate = Gate::default();
        self.detail_gates
            .lock()
            .unwrap()
            .insert(ReviewId::from(id), gate.clone());
        gate
    }

    /// Fail the next detail fetch for `id`.
    pub fn fail_detail(&self, id: &str, fail: Fail) {
        self.detail_failures
            .lock()
            .unwrap()
            .insert(ReviewId::from(id), fail);
    }

    pub fn gate_decision(&self) -> Gate {
        let gate = Gate::default();
        *self.decision_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn fail_decision(&self, fail: Fail) {
        *self.decision_failure.lock().unwrap() = Some(fail);
    }

    pub fn gate_update(&self) -> Gate {
        let gate = Gate::default();
        *self.update_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn fail_update(&self, fail: Fail) {
        *self.update_failure.lock().unwrap() = Some(fail);
    }

    pub fn set_areas(&self, areas: Vec<Area>) {
        *self.areas.lock().unwrap() = areas;
    }

    pub fn fail_areas(&self, fail: Fail) {
        *self.areas_failure.lock().unwrap() = Some(fail);
    }

    pub fn set_blocks(&self, area_id: AreaId, blocks: Vec<Block>) {
        self.blocks.lock().unwrap().insert(area_id, blocks);
    }

    pub fn gate_blocks(&self, area_id: AreaId) -> Gate {
        let gate = Gate::default();
        self.blocks_gates
            .lock()
            .unwrap()
            .insert(area_id, gate.clone());
        gate
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ReviewGateway for MockGateway {
    async fn pending_reviews(&self, _filter: &QueueFilter) -> Result<Vec<ReviewItem>, GatewayError> {
        self.record(Call::Queue);
        let scripted = self.queue_script.lock().unwrap().pop_front();
        match scripted {
            Some(reply) => {
                if let Some(gate) = reply.gate {
                    gate.wait().await;
                }
                reply.result.map_err(Fail::into_error)
            }
            None => Ok(self.queue_default.lock().unwrap().clone()),
        }
    }

    async fn review_detail(&self, id: &ReviewId) -> Result<ReviewDetail, GatewayError> {
        self.record(Call::Detail(id.clone()));
        let gate = self.detail_gates.lock().unwrap().remove(id);
        if let Some(gate) = gate {
            gate.wait().await;
        }
        let failure = self.detail_failures.lock().unwrap().remove(id);
        match failure {
            Some(fail) => Err(fail.into_error()),
            None => Ok(detail(id.as_str())),
        }
    }

    async fn submit_decision(
        &self,
        id: &ReviewId,
        decision: &Decision,
    ) -> Result<DecisionReceipt, GatewayError> {
        let request = decision.to_request();
        self.record(Call::Decision {
            id: id.clone(),
            action: request.action,
            notes: request.notes.to_string(),
        });
        let gate = self.decision_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.wait().await;
        }
        let failure = self.decision_failure.lock().unwrap().take();
        match failure {
            Some(fail) => Err(fail.into_error()),
            None => Ok(DecisionReceipt {
                status: match request.action {
                    "approve" => ReviewStatus::Approved,
                    _ => ReviewStatus::Rejected,
                },
            }),
        }
    }

    async fn update_site(
        &self,
        site_id: &str,
        update: &SiteUpdate,
    ) -> Result<serde_json::Value, GatewayError> {
        self.record(Call::UpdateSite {
            site_id: site_id.to_string(),
            update: update.clone(),
        });
        let gate = self.update_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.wait().await;
        }
        let failure = self.update_failure.lock().unwrap().take();
        match failure {
            Some(fail) => Err(fail.into_error()),
            None => Ok(serde_json::json!({ "id": site_id })),
        }
    }

    async fn areas(&self) -> Result<Vec<Area>, GatewayError> {
        self.record(Call::Areas);
        let failure = self.areas_failure.lock().unwrap().take();
        match failure {
            Some(fail) => Err(fail.into_error()),
            None => Ok(self.areas.lock().unwrap().clone()),
        }
    }

    async fn blocks(&self, area_id: AreaId) -> Result<Vec<Block>, GatewayError> {
        self.record(Call::Blocks(area_id));
        let gate = self.blocks_gates.lock().unwrap().remove(&area_id);
        if let Some(gate) = gate {
            gate.wait().await;
        }
        Ok(self
            .blocks
            .lock()
            .unwrap()
            .get(&area_id)
            .cloned()
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn item(id: &str, status: ReviewStatus) -> ReviewItem {
    ReviewItem {
        id: ReviewId::from(id),
        site_id: Some(format!("site-{id}")),
        status,
        priority: Priority::Normal,
        created_at: Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
        review_type: "NEW_SITE_VERIFICATION".to_string(),
        existing_site_id: None,
        created_by_user_name: "Ahmed Ali".to_string(),
        full_address: format!("House {id}, Block 15"),
    }
}

pub fn pending(id: &str) -> ReviewItem {
    item(id, ReviewStatus::PendingReview)
}

/// Detail for `id`: site `site-{id}` in area 1 ("Clifton"), block 10.
pub fn detail(id: &str) -> ReviewDetail {
    ReviewDetail {
        id: ReviewId::from(id),
        site_id: format!("site-{id}"),
        full_address: format!("House {id}, Block 15"),
        status: ReviewStatus::PendingReview,
        priority: Priority::Normal,
        created_at: Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
        created_by_user_name: "Ahmed Ali".to_string(),
        created_by_consumer_no: None,
        created_by_user_type: "CONSUMER".to_string(),
        site: SiteInfo {
            area_id: 1,
            area_name: "Clifton".to_string(),
            block_id: 10,
            block_name: "Block 9".to_string(),
            house_no: Some("45".to_string()),
            street: None,
            nearest_landmark: None,
            additional_directions: None,
            pin_lat: None,
            pin_lng: None,
            pin_accuracy_m: None,
            pin_captured_at: None,
            plot_key: None,
        },
        documents: Vec::new(),
    }
}

pub fn area(id: AreaId, name: &str) -> Area {
    Area {
        id,
        name: name.to_string(),
    }
}

pub fn block(id: i64, name: &str, area_id: AreaId) -> Block {
    Block {
        id,
        name: name.to_string(),
        area_id,
    }
}

pub fn ids(items: &[ReviewItem]) -> Vec<&str> {
    items.iter().map(|i| i.id.as_str()).collect()
}

