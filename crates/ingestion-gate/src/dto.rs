//! Inbound request/response shapes for the HTTP surface (§4.2, §6).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use alertmesh_kernel::{Alert, AlertStatus, AlertType, Severity};

/// The canonical alert candidate a client submits. Distinct from `Alert`
/// itself: clients never supply `status` or `received_at`, those are
/// assigned by the gate.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertSubmission {
    pub alert_id: String,
    #[serde(default)]
    pub event_timestamp: Option<DateTime<Utc>>,
    pub alert_type: AlertType,
    pub severity: Severity,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub source_ip: Option<String>,
    #[serde(default)]
    pub destination_ip: Option<String>,
    #[serde(default)]
    pub file_hash: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub asset_id: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub alert_metadata: HashMap<String, Value>,
}

impl AlertSubmission {
    pub fn into_alert(self, received_at: DateTime<Utc>) -> Alert {
        Alert {
            alert_id: self.alert_id,
            received_at,
            event_timestamp: self.event_timestamp.unwrap_or(received_at),
            alert_type: self.alert_type,
            severity: self.severity,
            title: self.title,
            description: self.description,
            source_ip: self.source_ip,
            destination_ip: self.destination_ip,
            file_hash: self.file_hash,
            url: self.url,
            domain: self.domain,
            asset_id: self.asset_id,
            user_name: self.user_name,
            status: AlertStatus::New,
            alert_metadata: self.alert_metadata,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IngestAccepted {
    pub alert_id: String,
    pub status: AlertStatus,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct IngestError {
    pub alert_id: Option<String>,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum IngestItemResult {
    Accepted(IngestAccepted),
    Rejected(IngestError),
}

#[derive(Debug, Deserialize)]
pub struct BatchSubmission {
    pub alerts: Vec<AlertSubmission>,
}

#[derive(Debug, Serialize)]
pub struct BatchResult {
    pub results: Vec<IngestItemResult>,
}

#[derive(Debug, Serialize)]
pub struct AlertStatusResponse {
    pub alert_id: String,
    pub status: AlertStatus,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub database: bool,
    pub message_queue: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub checks: HealthChecks,
}
