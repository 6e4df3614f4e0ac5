//! The three enrichment sub-records (§3 "Enriched context"), each optional
//! and independently cacheable.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkContext {
    pub is_internal: bool,
    pub subnet: Option<String>,
    pub geolocation: Option<String>,
    pub reputation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetContext {
    pub criticality: String,
    pub owner: Option<String>,
    pub environment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserContext {
    pub department: Option<String>,
    pub role: Option<String>,
    pub risk_profile: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichedContext {
    pub network: Option<NetworkContext>,
    pub asset: Option<AssetContext>,
    pub user: Option<UserContext>,
}

/// Deterministic cache keys, as required by §4.4.
pub fn network_key(subject: &str) -> String {
    format!("net:{subject}")
}

pub fn asset_key(subject: &str) -> String {
    format!("asset:{subject}")
}

pub fn user_key(subject: &str) -> String {
    format!("user:{subject}")
}
