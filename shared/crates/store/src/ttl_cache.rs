//! A generic per-subject TTL cache, grounded on the teacher's
//! `CachedThreatIntel` wrapper (`forensic_firewall/threat_intel.rs`): every
//! cached value carries its own expiry and is recomputed on miss. Used for
//! context enrichment (§4.4, 1h default) and threat-intel findings (§4.5,
//! 24h default) alike — the TTL is a property of the call, not the cache.

use std::time::{Duration, Instant};

use dashmap::DashMap;

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Cache keys are deterministic strings the caller builds (`net:{ip}`,
/// `asset:{id}`, `threat_intel:{provider}:{ioc}`, ...).
pub struct TtlCache<V: Clone> {
    entries: DashMap<String, Entry<V>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        match self.entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                drop(self.entries.remove(key));
                None
            }
            None => None,
        }
    }

    pub fn set(&self, key: String, value: V, ttl: Duration) {
        self.entries.insert(
            key,
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}
