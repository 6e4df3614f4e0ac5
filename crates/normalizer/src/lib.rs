//! Alertmesh Normalizer: vendor field mapping, severity mapping, timestamp
//! parsing, IOC extraction and fingerprint-based dedup. Consumes
//! `alert.raw`, publishes `alert.normalized`.

pub mod alert_type;
pub mod dedup;
pub mod field_mapping;
pub mod handler;
pub mod ioc;

pub use handler::{NormalizedAlert, NormalizerHandler};
