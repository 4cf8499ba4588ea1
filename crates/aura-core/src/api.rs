//! In-process stand-in for the AURA support API
//!
//! Every call sleeps for a configurable latency and then succeeds. Request
//! and response types keep the field names of the support service's HTTP
//! contract so they serialize to the same JSON.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::intent::{Response, ResponseKind, RuleSet};
use crate::tracker::{Technician, TechnicianStatus};

const ETA_CYCLE_MS: i64 = 900_000;
const COORDINATE_JITTER: f64 = 0.01;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyType {
    Text,
    Action,
}

impl From<ResponseKind> for ReplyType {
    fn from(kind: ResponseKind) -> Self {
        match kind {
            ResponseKind::Informational => ReplyType::Text,
            ResponseKind::Actionable => ReplyType::Action,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    #[serde(rename = "type")]
    pub reply_type: ReplyType,
}

impl From<ReplyType> for ResponseKind {
    fn from(reply_type: ReplyType) -> Self {
        match reply_type {
            ReplyType::Text => ResponseKind::Informational,
            ReplyType::Action => ResponseKind::Actionable,
        }
    }
}

impl From<Response> for ChatResponse {
    fn from(response: Response) -> Self {
        ChatResponse {
            reply: response.text,
            reply_type: response.kind.into(),
        }
    }
}

impl From<ChatResponse> for Response {
    fn from(response: ChatResponse) -> Self {
        Response {
            text: response.reply,
            kind: response.reply_type.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechLocation {
    pub lat: f64,
    pub lng: f64,
    /// `"<n> minutes"`
    pub eta: String,
    pub status: TechnicianStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueLog {
    pub issue_id: String,
    pub steps_completed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketReceipt {
    pub success: bool,
    pub ticket_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentRequest {
    #[serde(rename = "timeSlot")]
    pub time_slot: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentReceipt {
    pub success: bool,
    pub appointment_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub status: String,
    pub uptime: String,
}

/// Simulated round-trip time per operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiLatency {
    pub chat_ms: u64,
    pub location_ms: u64,
    pub log_issue_ms: u64,
    pub schedule_ms: u64,
}

impl Default for ApiLatency {
    fn default() -> Self {
        Self {
            chat_ms: 1000,
            location_ms: 500,
            log_issue_ms: 300,
            schedule_ms: 800,
        }
    }
}

impl ApiLatency {
    /// No delay at all
    pub fn instant() -> Self {
        Self {
            chat_ms: 0,
            location_ms: 0,
            log_issue_ms: 0,
            schedule_ms: 0,
        }
    }
}

#[derive(Clone)]
pub struct MockApi {
    rules: Arc<RuleSet>,
    latency: ApiLatency,
}

impl MockApi {
    pub fn new(rules: Arc<RuleSet>, latency: ApiLatency) -> Self {
        Self { rules, latency }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// POST /api/chat
    pub async fn send_chat_message(&self, request: ChatRequest) -> ChatResponse {
        simulate_latency(self.latency.chat_ms).await;

        self.rules.classify(&request.message).into()
    }

    /// GET /api/tech-location
    pub async fn get_technician_location(&self) -> TechLocation {
        simulate_latency(self.latency.location_ms).await;

        let eta = eta_for_clock(Utc::now().timestamp_millis());
        let origin = Technician::seed().location;
        let mut rng = rand::thread_rng();

        TechLocation {
            lat: origin.lat + (rng.gen::<f64>() - 0.5) * COORDINATE_JITTER,
            lng: origin.lng + (rng.gen::<f64>() - 0.5) * COORDINATE_JITTER,
            eta: format!("{} minutes", eta),
            status: TechnicianStatus::from_eta(eta),
        }
    }

    /// POST /api/log-issue
    pub async fn log_issue(&self, issue: IssueLog) -> TicketReceipt {
        simulate_latency(self.latency.log_issue_ms).await;

        let ticket_id = stamped_id("TKT");
        tracing::info!(
            issue_id = %issue.issue_id,
            steps_completed = issue.steps_completed,
            %ticket_id,
            "issue logged"
        );

        TicketReceipt {
            success: true,
            ticket_id,
        }
    }

    pub async fn schedule_appointment(&self, request: AppointmentRequest) -> AppointmentReceipt {
        simulate_latency(self.latency.schedule_ms).await;

        let appointment_id = stamped_id("APT");
        tracing::info!(time_slot = %request.time_slot, %appointment_id, "appointment scheduled");

        AppointmentReceipt {
            success: true,
            appointment_id,
        }
    }

    pub async fn get_service_status(&self) -> ServiceStatus {
        ServiceStatus {
            status: "operational".to_string(),
            uptime: "99.9%".to_string(),
        }
    }
}

async fn simulate_latency(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

/// Prefix plus the current Unix time in milliseconds. Unique only to the
/// millisecond.
fn stamped_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Utc::now().timestamp_millis())
}

/// ETA on the 15 minute demo cycle: counts down from 15 each cycle and never
/// drops below 1.
pub fn eta_for_clock(now_ms: i64) -> u32 {
    let minutes_elapsed = now_ms.rem_euclid(ETA_CYCLE_MS) / 60_000;
    (15 - minutes_elapsed).max(1) as u32
}
