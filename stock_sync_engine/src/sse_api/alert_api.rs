use log::*;

use crate::{
    db_types::{NewOperatorAlert, OperatorAlert},
    events::{EventProducers, OperatorAlertEvent},
    traits::{AlertStore, AlertStoreError},
};

/// The Notifier: persists operator alerts and publishes them to subscribed hooks.
///
/// Alerts are strictly best-effort. A failure to persist or publish is logged and swallowed; it must never undo or
/// block the stock mutation that triggered it.
#[derive(Clone)]
pub struct AlertApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> AlertApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> AlertApi<B>
where B: AlertStore
{
    /// Fire-and-forget alert emission.
    pub async fn notify(&self, alert: NewOperatorAlert) {
        debug!("📣️ Raising operator alert: {}", alert.title);
        match self.db.insert_alert(&alert).await {
            Ok(id) => trace!("📣️ Operator alert #{id} persisted"),
            Err(e) => error!("📣️ Failed to persist operator alert '{}': {e}", alert.title),
        }
        for producer in &self.producers.alert_producers {
            producer.publish_event(OperatorAlertEvent::new(alert.clone())).await;
        }
    }

    pub async fn recent(&self, limit: i64) -> Result<Vec<OperatorAlert>, AlertStoreError> {
        self.db.recent_alerts(limit).await
    }
}
