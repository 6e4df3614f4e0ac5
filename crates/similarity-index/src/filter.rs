//! Metadata filtering applied after the similarity threshold cut (§4.8):
//! "search(text, k, threshold, filter?) ... apply metadata filter, if
//! given, before truncating to k".

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

#[derive(Debug, Clone, Default)]
pub struct MetadataFilter {
    pub alert_type: Option<String>,
    pub since: Option<DateTime<Utc>>,
}

impl MetadataFilter {
    pub fn matches(&self, metadata: &HashMap<String, Value>) -> bool {
        if let Some(expected_type) = &self.alert_type {
            let actual = metadata.get("alert_type").and_then(Value::as_str);
            if actual != Some(expected_type.as_str()) {
                return false;
            }
        }
        if let Some(since) = self.since {
            let indexed_at = metadata
                .get("indexed_at")
                .and_then(Value::as_str)
                .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
                .map(|dt| dt.with_timezone(&Utc));
            match indexed_at {
                Some(ts) if ts >= since => {}
                _ => return false,
            }
        }
        true
    }
}
