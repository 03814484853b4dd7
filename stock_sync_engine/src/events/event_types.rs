use chrono::{DateTime, Utc};

use crate::db_types::NewOperatorAlert;

/// Published whenever the engine raises an operator alert: a sale notice, a manual-action request for a
/// policy-restricted channel, or a failed propagation.
#[derive(Debug, Clone)]
pub struct OperatorAlertEvent {
    pub alert: NewOperatorAlert,
    pub raised_at: DateTime<Utc>,
}

impl OperatorAlertEvent {
    pub fn new(alert: NewOperatorAlert) -> Self {
        Self { alert, raised_at: Utc::now() }
    }
}
