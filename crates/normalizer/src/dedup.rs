//! Fingerprint dedup window (§4.3 step 5): a bounded in-process set of
//! recently seen fingerprints with FIFO eviction once the bound is reached.
//! `spec.md` only says "the source implies `cache.clear()`"; FIFO is the
//! interpretation recorded as an open-question resolution in DESIGN.md.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

use alertmesh_kernel::Fingerprint;

pub struct DedupWindow {
    capacity: usize,
    order: Mutex<VecDeque<Fingerprint>>,
    seen: Mutex<HashSet<Fingerprint>>,
}

impl DedupWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            order: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            seen: Mutex::new(HashSet::with_capacity(capacity.min(1024))),
        }
    }

    /// Returns `true` if `fingerprint` was already present (the caller
    /// should ack without republishing); `false` if it was newly recorded.
    pub fn check_and_insert(&self, fingerprint: Fingerprint) -> bool {
        let mut seen = self.seen.lock().unwrap();
        if seen.contains(&fingerprint) {
            return true;
        }
        let mut order = self.order.lock().unwrap();
        if order.len() >= self.capacity {
            if let Some(evicted) = order.pop_front() {
                seen.remove(&evicted);
            }
        }
        order.push_back(fingerprint);
        seen.insert(fingerprint);
        false
    }

    pub fn len(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
