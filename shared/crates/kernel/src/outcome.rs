//! The outcome model every stage handler returns. Exceptions never cross
//! the broker boundary: the broker adapter alone translates an `Outcome`
//! into ack / nack-to-retry / dead-letter.

use std::fmt;

#[derive(Debug, Clone)]
pub enum Outcome {
    /// The message was fully processed (possibly a no-op, e.g. a
    /// deduplicated fingerprint). Ack and move on.
    Ok,
    /// A transient failure (broker/db/provider/LLM timeout or
    /// unavailability). Nack-to-retry; the broker counts attempts and
    /// routes to DLQ once the cap is reached.
    Retryable { reason: String },
    /// The payload cannot be understood by this stage. Route to DLQ
    /// immediately with `reason` attached as metadata.
    Fatal { reason: String },
    /// A sub-operation failed but the stage still produced a
    /// reduced-fidelity result. Treated as `Ok` by the broker adapter but
    /// flagged for observability.
    Degraded { reason: String },
}

impl Outcome {
    pub fn retryable(reason: impl Into<String>) -> Self {
        Outcome::Retryable {
            reason: reason.into(),
        }
    }

    pub fn fatal(reason: impl Into<String>) -> Self {
        Outcome::Fatal {
            reason: reason.into(),
        }
    }

    pub fn degraded(reason: impl Into<String>) -> Self {
        Outcome::Degraded {
            reason: reason.into(),
        }
    }

    pub fn is_terminal_success(&self) -> bool {
        matches!(self, Outcome::Ok | Outcome::Degraded { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Ok => write!(f, "ok"),
            Outcome::Retryable { reason } => write!(f, "retryable: {reason}"),
            Outcome::Fatal { reason } => write!(f, "fatal: {reason}"),
            Outcome::Degraded { reason } => write!(f, "degraded: {reason}"),
        }
    }
}
