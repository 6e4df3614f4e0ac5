//! Canonical queue names shared by every stage, so the topology declared
//! by the broker and the names published/consumed by each stage can never
//! drift apart.

pub const ALERT_RAW: &str = "alert.raw";
pub const ALERT_NORMALIZED: &str = "alert.normalized";
pub const ALERT_ENRICHED: &str = "alert.enriched";
pub const ALERT_CONTEXTUALIZED: &str = "alert.contextualized";
pub const ALERT_RESULT: &str = "alert.result";

/// Every primary queue `Q` gets a retry queue `Q.retry` (delay + dead-letter
/// routing back to `Q`) and a terminal `Q.dlq`.
pub fn retry_queue(primary: &str) -> String {
    format!("{primary}.retry")
}

pub fn dlq_queue(primary: &str) -> String {
    format!("{primary}.dlq")
}

pub const PRIMARY_QUEUES: [&str; 5] = [
    ALERT_RAW,
    ALERT_NORMALIZED,
    ALERT_ENRICHED,
    ALERT_CONTEXTUALIZED,
    ALERT_RESULT,
];
