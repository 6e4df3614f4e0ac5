use serde_json::Value;

/// A message that exhausted its retry budget or was classified fatal.
/// Testable property #5: every `DeadLetter` satisfies
/// `retry_count >= max_retries OR reason indicates a fatal classification`.
#[derive(Debug, Clone)]
pub struct DeadLetter {
    pub queue: String,
    pub envelope: Value,
    pub reason: String,
    pub retry_count: u32,
    pub fatal: bool,
}
