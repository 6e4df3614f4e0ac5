//! Vendor field mapping (§4.3 step 1): a configurable table maps vendor
//! field names to canonical ones. Each canonical field carries an ordered
//! list of candidate source names; first non-null value wins. Splunk and
//! QRadar aliases are built in; the `default` vocabulary covers the
//! canonical names themselves so an already-canonical payload round-trips
//! unchanged.

use serde_json::Value;

pub struct FieldMapping {
    pub canonical: &'static str,
    pub candidates: &'static [&'static str],
}

/// Ordered vendor-to-canonical table. Order within `candidates` matters:
/// canonical name first, then Splunk, then QRadar, then other common
/// aliases, so an unambiguous canonical payload is never shadowed by a
/// vendor alias that happens to also be present.
pub const DEFAULT_MAPPINGS: &[FieldMapping] = &[
    FieldMapping { canonical: "alert_id", candidates: &["alert_id", "id", "event_id", "_cd"] },
    FieldMapping { canonical: "alert_type", candidates: &["alert_type", "category", "signature", "type"] },
    FieldMapping { canonical: "severity", candidates: &["severity", "urgency", "priority", "magnitude"] },
    FieldMapping { canonical: "title", candidates: &["title", "signature", "rule_name", "name"] },
    FieldMapping { canonical: "description", candidates: &["description", "message", "summary", "desc"] },
    FieldMapping { canonical: "source_ip", candidates: &["source_ip", "src_ip", "sourceip", "src"] },
    FieldMapping { canonical: "destination_ip", candidates: &["destination_ip", "dest_ip", "destinationip", "dest"] },
    FieldMapping { canonical: "file_hash", candidates: &["file_hash", "hash", "sha256", "sha1", "md5"] },
    FieldMapping { canonical: "url", candidates: &["url", "uri", "request_url"] },
    FieldMapping { canonical: "domain", candidates: &["domain", "dest_host", "hostname"] },
    FieldMapping { canonical: "asset_id", candidates: &["asset_id", "dvc", "log_source", "host_id"] },
    FieldMapping { canonical: "user_name", candidates: &["user_name", "user", "src_user", "username"] },
    FieldMapping { canonical: "event_timestamp", candidates: &["event_timestamp", "timestamp", "_time", "devTime", "startTime"] },
];

/// Applies `DEFAULT_MAPPINGS` to `raw`, returning a canonical-keyed map.
/// Missing fields are simply absent from the result.
pub fn apply(raw: &Value) -> std::collections::HashMap<&'static str, Value> {
    let mut out = std::collections::HashMap::new();
    for mapping in DEFAULT_MAPPINGS {
        for candidate in mapping.candidates {
            if let Some(value) = raw.get(candidate) {
                if !value.is_null() {
                    out.insert(mapping.canonical, value.clone());
                    break;
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_field_wins_over_vendor_alias() {
        let raw = json!({ "source_ip": "10.0.0.1", "src_ip": "10.0.0.2" });
        let mapped = apply(&raw);
        assert_eq!(mapped["source_ip"], json!("10.0.0.1"));
    }

    #[test]
    fn splunk_alias_is_picked_up_when_canonical_absent() {
        let raw = json!({ "src_ip": "10.0.0.2", "dest_ip": "10.0.0.3" });
        let mapped = apply(&raw);
        assert_eq!(mapped["source_ip"], json!("10.0.0.2"));
        assert_eq!(mapped["destination_ip"], json!("10.0.0.3"));
    }

    #[test]
    fn qradar_alias_is_picked_up() {
        let raw = json!({ "sourceip": "10.0.0.5", "dvc": "SRV-1" });
        let mapped = apply(&raw);
        assert_eq!(mapped["source_ip"], json!("10.0.0.5"));
        assert_eq!(mapped["asset_id"], json!("SRV-1"));
    }

    #[test]
    fn missing_field_is_absent() {
        let raw = json!({});
        let mapped = apply(&raw);
        assert!(!mapped.contains_key("source_ip"));
    }
}
