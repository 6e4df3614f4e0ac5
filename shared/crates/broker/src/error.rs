use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum PublishError {
    #[error("publisher confirm not received within {deadline_ms}ms")]
    ConfirmTimeout { deadline_ms: u64 },
    #[error("queue {0} is not declared")]
    UnknownQueue(String),
    #[error("broker connection unavailable: {0}")]
    ConnectionUnavailable(String),
}

#[derive(Debug, Error, Clone)]
pub enum ConsumeError {
    #[error("queue {0} is not declared")]
    UnknownQueue(String),
    #[error("broker connection unavailable: {0}")]
    ConnectionUnavailable(String),
}
