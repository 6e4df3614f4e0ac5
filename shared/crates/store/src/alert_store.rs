//! `AlertStore`: the one table every stage writes into, each restricted to
//! disjoint columns (§5) except for the shared `status` column, which only
//! ever advances (`AlertStatus::can_transition_to`).

use async_trait::async_trait;
use dashmap::DashMap;

use alertmesh_kernel::{Alert, AlertStatus};

use crate::error::StoreError;

#[async_trait]
pub trait AlertStore: Send + Sync {
    /// Inserts a new row if `alert_id` is unseen. Re-inserting the same
    /// `alert_id` is a no-op (idempotent against retried `POST`s, §4.2).
    async fn insert_new(&self, alert: Alert) -> Result<(), StoreError>;

    async fn get(&self, alert_id: &str) -> Result<Option<Alert>, StoreError>;

    /// Advances `status`, rejecting any transition that is not forward
    /// (or into `Error`).
    async fn advance_status(&self, alert_id: &str, next: AlertStatus) -> Result<(), StoreError>;

    /// Applies a mutation to stage-owned columns without touching `status`.
    /// `mutate` runs against a clone of the current row; the closure's
    /// return value replaces the stored row.
    async fn update_fields(
        &self,
        alert_id: &str,
        mutate: Box<dyn for<'a> FnOnce(&'a mut Alert) + Send + 'static>,
    ) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct InMemoryAlertStore {
    rows: DashMap<String, Alert>,
}

impl InMemoryAlertStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AlertStore for InMemoryAlertStore {
    async fn insert_new(&self, alert: Alert) -> Result<(), StoreError> {
        self.rows.entry(alert.alert_id.clone()).or_insert(alert);
        Ok(())
    }

    async fn get(&self, alert_id: &str) -> Result<Option<Alert>, StoreError> {
        Ok(self.rows.get(alert_id).map(|r| r.clone()))
    }

    async fn advance_status(&self, alert_id: &str, next: AlertStatus) -> Result<(), StoreError> {
        let mut row = self
            .rows
            .get_mut(alert_id)
            .ok_or_else(|| StoreError::NotFound(alert_id.to_string()))?;
        if !row.status.can_transition_to(next) {
            return Err(StoreError::InvalidTransition {
                alert_id: alert_id.to_string(),
                from: row.status,
                to: next,
            });
        }
        row.status = next;
        Ok(())
    }

    async fn update_fields(
        &self,
        alert_id: &str,
        mutate: Box<dyn for<'a> FnOnce(&'a mut Alert) + Send + 'static>,
    ) -> Result<(), StoreError> {
        let mut row = self
            .rows
            .get_mut(alert_id)
            .ok_or_else(|| StoreError::NotFound(alert_id.to_string()))?;
        mutate(&mut row);
        Ok(())
    }
}
