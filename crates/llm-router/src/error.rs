use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum RouterError {
    #[error("no healthy model covers this task")]
    RouterUnavailable,
}
