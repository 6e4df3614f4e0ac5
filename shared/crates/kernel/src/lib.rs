//! Alertmesh Kernel
//!
//! Primitives shared by every stage of the alert-triage pipeline: the
//! broker envelope schema, alert identity and status transitions, the
//! outcome model that the broker adapter maps onto ack/nack/DLQ, and a
//! validated stage configuration loader.

pub mod alert;
pub mod config;
pub mod envelope;
pub mod fingerprint;
pub mod outcome;
pub mod queues;
pub mod time;

pub use alert::{Alert, AlertStatus, AlertType, Severity, ValidationError};
pub use config::StageConfig;
pub use envelope::{Envelope, Meta};
pub use fingerprint::Fingerprint;
pub use outcome::Outcome;
