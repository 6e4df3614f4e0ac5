//! Resolver capability interfaces (§4.4, §9 "polymorphism over resolvers
//! ... expressed via capability interfaces and a registry keyed by name").
//! Each resolver is independent: failure of one never fails the stage, it
//! just leaves the corresponding sub-context absent.

use async_trait::async_trait;

use alertmesh_store::{AssetContext, NetworkContext, UserContext};

#[async_trait]
pub trait NetworkResolver: Send + Sync {
    async fn resolve(&self, ip: &str) -> Option<NetworkContext>;
}

#[async_trait]
pub trait AssetResolver: Send + Sync {
    async fn resolve(&self, asset_id: &str) -> Option<AssetContext>;
}

#[async_trait]
pub trait UserResolver: Send + Sync {
    async fn resolve(&self, user_name: &str) -> Option<UserContext>;
}
