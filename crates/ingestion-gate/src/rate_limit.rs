//! Per-remote-address rate limiting (§4.2): "token-bucket or fixed-window,
//! keyed by remote address, 100 req/min default, returning 429 with a
//! Retry-After hint when exhausted." A process-local in-memory bucket;
//! "a small in-memory fallback is acceptable if a distributed limiter is
//! unavailable."

use std::time::{Duration, Instant};

use dashmap::DashMap;

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

pub struct RateLimiter {
    buckets: DashMap<String, Bucket>,
    capacity: f64,
    refill_per_second: f64,
}

pub struct Decision {
    pub allowed: bool,
    pub retry_after: Duration,
}

impl RateLimiter {
    pub fn new(requests_per_minute: u32) -> Self {
        Self {
            buckets: DashMap::new(),
            capacity: requests_per_minute as f64,
            refill_per_second: requests_per_minute as f64 / 60.0,
        }
    }

    /// Consumes one token for `key` if available; otherwise reports how
    /// long the caller should wait before retrying.
    pub fn check(&self, key: &str) -> Decision {
        let mut bucket = self.buckets.entry(key.to_string()).or_insert_with(|| Bucket {
            tokens: self.capacity,
            last_refill: Instant::now(),
        });

        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_per_second).min(self.capacity);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            Decision {
                allowed: true,
                retry_after: Duration::ZERO,
            }
        } else {
            let deficit = 1.0 - bucket.tokens;
            let wait_seconds = deficit / self.refill_per_second.max(f64::EPSILON);
            Decision {
                allowed: false,
                retry_after: Duration::from_secs_f64(wait_seconds.max(1.0)),
            }
        }
    }
}
