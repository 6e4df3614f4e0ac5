//! Provider registry: concurrent fan-out bounded by a semaphore, each call
//! under its own deadline. A provider timeout or error becomes an
//! `unknown` finding rather than failing the stage (§4.5).

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::warn;

use alertmesh_store::TtlCache;

use crate::provider::{Finding, ThreatIntelProvider, Verdict};

pub struct ProviderRegistry {
    providers: Vec<Arc<dyn ThreatIntelProvider>>,
    concurrency: Arc<Semaphore>,
    provider_deadline: Duration,
    cache: TtlCache<Finding>,
    cache_ttl: Duration,
}

impl ProviderRegistry {
    pub fn new(
        providers: Vec<Arc<dyn ThreatIntelProvider>>,
        max_concurrency: usize,
        provider_deadline: Duration,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            providers,
            concurrency: Arc::new(Semaphore::new(max_concurrency.max(1))),
            provider_deadline,
            cache: TtlCache::new(),
            cache_ttl,
        }
    }

    /// Queries every registered provider for `ioc` concurrently, bounded by
    /// `max_concurrency`, with a per-(provider, ioc) cache keyed exactly as
    /// the lookup is keyed. A provider that errors or exceeds its deadline
    /// contributes an `unknown` finding instead of being omitted, so
    /// aggregation always has one entry per registered provider.
    pub async fn lookup_all(&self, ioc: &str) -> Vec<Finding> {
        let calls = self.providers.iter().map(|provider| {
            let provider = provider.clone();
            let ioc = ioc.to_string();
            let permit = self.concurrency.clone();
            let deadline = self.provider_deadline;
            let cache_key = format!("threat_intel:{}:{ioc}", provider.name());
            async move {
                if let Some(cached) = self.cache.get(&cache_key) {
                    return cached;
                }
                let _permit = permit.acquire_owned().await.expect("semaphore not closed");
                let finding = match tokio::time::timeout(deadline, provider.lookup(&ioc)).await {
                    Ok(Ok(finding)) => finding,
                    Ok(Err(err)) => {
                        warn!(provider = provider.name(), %ioc, %err, "provider lookup failed");
                        unknown_finding(provider.name(), &ioc)
                    }
                    Err(_) => {
                        warn!(provider = provider.name(), %ioc, "provider lookup exceeded its deadline");
                        unknown_finding(provider.name(), &ioc)
                    }
                };
                self.cache.set(cache_key, finding.clone(), self.cache_ttl);
                finding
            }
        });
        futures::future::join_all(calls).await
    }
}

fn unknown_finding(provider: &str, ioc: &str) -> Finding {
    Finding {
        provider: provider.to_string(),
        ioc: ioc.to_string(),
        verdict: Verdict::Unknown,
        score: 0,
        evidence: vec![format!("{provider}: lookup failed")],
        fetched_at: alertmesh_kernel::time::now_utc(),
    }
}
