//! Vendor `alert_type`/`category`/`signature` string to canonical
//! `AlertType`. Unlike severity, the spec does not mandate a specific
//! fallback for an unrecognized type string; `Other` is the natural choice
//! since `AlertType` already names it for exactly this case.

use alertmesh_kernel::AlertType;

pub fn from_vendor_str(raw: &str) -> AlertType {
    match raw.trim().to_ascii_lowercase().as_str() {
        "malware" | "virus" | "trojan" | "ransomware" => AlertType::Malware,
        "phishing" | "spearphishing" => AlertType::Phishing,
        "brute_force" | "brute-force" | "bruteforce" | "credential_stuffing" => AlertType::BruteForce,
        "data_exfiltration" | "exfiltration" | "data-exfil" => AlertType::DataExfiltration,
        "intrusion" | "unauthorized_access" | "lateral_movement" => AlertType::Intrusion,
        "ddos" | "dos" | "denial_of_service" => AlertType::Ddos,
        "anomaly" | "anomalous_behavior" | "outlier" => AlertType::Anomaly,
        _ => AlertType::Other,
    }
}
