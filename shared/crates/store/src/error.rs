use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum StoreError {
    #[error("alert {0} not found")]
    NotFound(String),
    #[error("alert {alert_id} cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        alert_id: String,
        from: alertmesh_kernel::AlertStatus,
        to: alertmesh_kernel::AlertStatus,
    },
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}
