//! Mock asset/user resolvers (§4.4: "built-in internal-IP heuristic + mock
//! resolvers; production resolvers plug in behind the same interface").
//! These stand in for the CMDB/IAM lookups a real deployment would make.

use async_trait::async_trait;

use alertmesh_store::{AssetContext, UserContext};

use crate::resolver::{AssetResolver, UserResolver};

/// Classifies by naming convention (`*-PROD-*` / `*-PRD-*` → high
/// criticality, everything else → medium), the simplest rule that still
/// lets S1's "critical asset" scenario exercise the high-criticality path.
pub struct MockAssetResolver;

#[async_trait]
impl AssetResolver for MockAssetResolver {
    async fn resolve(&self, asset_id: &str) -> Option<AssetContext> {
        if asset_id.trim().is_empty() {
            return None;
        }
        let upper = asset_id.to_ascii_uppercase();
        let criticality = if upper.contains("PROD") || upper.contains("PRD") {
            "high"
        } else {
            "medium"
        };
        Some(AssetContext {
            criticality: criticality.to_string(),
            owner: None,
            environment: if upper.contains("PROD") {
                Some("production".to_string())
            } else {
                None
            },
        })
    }
}

pub struct MockUserResolver;

#[async_trait]
impl UserResolver for MockUserResolver {
    async fn resolve(&self, user_name: &str) -> Option<UserContext> {
        if user_name.trim().is_empty() {
            return None;
        }
        Some(UserContext {
            department: None,
            role: None,
            risk_profile: Some("unknown".to_string()),
        })
    }
}
