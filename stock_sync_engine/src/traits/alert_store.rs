use thiserror::Error;

use crate::db_types::{NewOperatorAlert, OperatorAlert};

/// Operator-visible action items. The engine inserts; acknowledgement happens out of band.
#[allow(async_fn_in_trait)]
pub trait AlertStore {
    async fn insert_alert(&self, alert: &NewOperatorAlert) -> Result<i64, AlertStoreError>;

    async fn recent_alerts(&self, limit: i64) -> Result<Vec<OperatorAlert>, AlertStoreError>;
}

#[derive(Debug, Clone, Error)]
pub enum AlertStoreError {
    #[error("Internal alert store error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for AlertStoreError {
    fn from(e: sqlx::Error) -> Self {
        AlertStoreError::DatabaseError(e.to_string())
    }
}
