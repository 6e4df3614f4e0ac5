//! Canonical alert type, shared by every stage.
//!
//! The `Alert` struct mirrors the `alerts` table described in the external
//! interfaces: identity is the externally supplied `alert_id`, `status`
//! advances monotonically along the pipeline (except into `Error`).

use std::collections::HashMap;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::time;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    Malware,
    Phishing,
    BruteForce,
    DataExfiltration,
    Intrusion,
    Ddos,
    Anomaly,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Maps a vendor-supplied, free-text severity string onto the canonical
    /// enum. Unknown strings fall back to `Medium` per the Normalizer spec.
    pub fn from_vendor_str(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "critical" | "crit" | "p1" | "sev1" => Severity::Critical,
            "high" | "p2" | "sev2" => Severity::High,
            "medium" | "med" | "p3" | "sev3" | "moderate" => Severity::Medium,
            "low" | "p4" | "sev4" => Severity::Low,
            "info" | "informational" | "p5" | "sev5" => Severity::Info,
            _ => Severity::Medium,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    New,
    Normalized,
    Enriched,
    Analyzed,
    Closed,
    Error,
}

impl AlertStatus {
    /// Returns true when `self -> next` is an allowed forward transition.
    /// Every status may transition into `Error`; otherwise the pipeline
    /// order `New -> Normalized -> Enriched -> Analyzed -> Closed` must be
    /// respected and no status may move backward.
    pub fn can_transition_to(self, next: AlertStatus) -> bool {
        if next == AlertStatus::Error {
            return true;
        }
        Self::rank(next) > Self::rank(self) || (self == next)
    }

    fn rank(status: AlertStatus) -> u8 {
        match status {
            AlertStatus::New => 0,
            AlertStatus::Normalized => 1,
            AlertStatus::Enriched => 2,
            AlertStatus::Analyzed => 3,
            AlertStatus::Closed => 4,
            AlertStatus::Error => u8::MAX,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub alert_id: String,
    pub received_at: DateTime<Utc>,
    pub event_timestamp: DateTime<Utc>,
    pub alert_type: AlertType,
    pub severity: Severity,
    pub title: Option<String>,
    pub description: Option<String>,
    pub source_ip: Option<String>,
    pub destination_ip: Option<String>,
    pub file_hash: Option<String>,
    pub url: Option<String>,
    pub domain: Option<String>,
    pub asset_id: Option<String>,
    pub user_name: Option<String>,
    pub status: AlertStatus,
    #[serde(default)]
    pub alert_metadata: HashMap<String, Value>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("alert_id is required")]
    MissingAlertId,
    #[error("unknown severity: {0}")]
    UnknownSeverity(String),
    #[error("unknown alert_type: {0}")]
    UnknownAlertType(String),
    #[error("invalid ip address in field {field}: {value}")]
    InvalidIp { field: &'static str, value: String },
    #[error("invalid hash length in field {field}: expected 32, 40 or 64 hex chars, got {len}")]
    InvalidHashLength { field: &'static str, len: usize },
    #[error("invalid hash characters in field {field}")]
    InvalidHashChars { field: &'static str },
    #[error("event_timestamp {0} is in the future")]
    FutureTimestamp(DateTime<Utc>),
}

/// Validates the structural invariants from the data model: `alert_id`
/// present, hash length in {32,40,64} hex, IPs parseable, event timestamp
/// not beyond `now + clock_skew`.
pub fn validate(alert: &Alert, clock_skew: chrono::Duration) -> Result<(), ValidationError> {
    if alert.alert_id.trim().is_empty() {
        return Err(ValidationError::MissingAlertId);
    }

    if let Some(ip) = &alert.source_ip {
        validate_ip("source_ip", ip)?;
    }
    if let Some(ip) = &alert.destination_ip {
        validate_ip("destination_ip", ip)?;
    }
    if let Some(hash) = &alert.file_hash {
        validate_hash("file_hash", hash)?;
    }

    if alert.event_timestamp > time::now_utc() + clock_skew {
        return Err(ValidationError::FutureTimestamp(alert.event_timestamp));
    }

    Ok(())
}

fn validate_ip(field: &'static str, value: &str) -> Result<(), ValidationError> {
    value
        .parse::<IpAddr>()
        .map(|_| ())
        .map_err(|_| ValidationError::InvalidIp {
            field,
            value: value.to_string(),
        })
}

fn validate_hash(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if !value.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::InvalidHashChars { field });
    }
    match value.len() {
        32 | 40 | 64 => Ok(()),
        len => Err(ValidationError::InvalidHashLength { field, len }),
    }
}
