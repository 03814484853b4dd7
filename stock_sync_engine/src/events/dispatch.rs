//! Simple stateless pub-sub dispatch for operator alerts.
//!
//! Subscribers react to alert events without access to engine internals and without blocking the sync path; the
//! handlers can be async.
use std::{
    future::Future,
    pin::Pin,
    sync::{atomic::AtomicI64, Arc},
};

use log::*;
use tokio::sync::mpsc;

use crate::events::OperatorAlertEvent;

pub type HookFn = Arc<dyn Fn(OperatorAlertEvent) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

pub struct AlertHandler {
    listener: mpsc::Receiver<OperatorAlertEvent>,
    sender: mpsc::Sender<OperatorAlertEvent>,
    handler: HookFn,
}

impl AlertHandler {
    pub fn new(buffer_size: usize, handler: HookFn) -> Self {
        let (sender, receiver) = mpsc::channel(buffer_size);
        Self { listener: receiver, sender, handler }
    }

    pub fn subscribe(&self) -> AlertProducer {
        AlertProducer::new(self.sender.clone())
    }

    /// Consumes events until the last producer is dropped, then waits for in-flight handler invocations to finish.
    pub async fn start_handler(mut self) {
        debug!("📣️ Starting alert handler");
        // drop the internal sender so the loop ends once the last subscriber is gone
        drop(self.sender);
        let jobs = Arc::new(AtomicI64::new(0));
        while let Some(ev) = self.listener.recv().await {
            trace!("📣️ Handling alert event");
            let handler = Arc::clone(&self.handler);
            jobs.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            let job = jobs.clone();
            tokio::spawn(async move {
                (handler)(ev).await;
                job.fetch_sub(1, std::sync::atomic::Ordering::Relaxed);
                trace!("📣️ Alert event handled");
            });
        }
        while jobs.load(std::sync::atomic::Ordering::SeqCst) > 0 {
            debug!("📣️ Waiting for alert jobs to complete");
            tokio::time::sleep(tokio::time::Duration::from_millis(250)).await;
        }
        debug!("📣️ Alert handler has shut down");
    }
}

#[derive(Clone)]
pub struct AlertProducer {
    sender: mpsc::Sender<OperatorAlertEvent>,
}

impl AlertProducer {
    pub fn new(sender: mpsc::Sender<OperatorAlertEvent>) -> Self {
        Self { sender }
    }

    pub async fn publish_event(&self, event: OperatorAlertEvent) {
        if let Err(e) = self.sender.send(event).await {
            error!("📣️ Failed to publish alert event: {e}");
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::AtomicU64;

    use ssg_common::Quantity;

    use super::*;
    use crate::db_types::{ChannelId, NewOperatorAlert, Sku};

    #[tokio::test]
    async fn all_published_events_reach_the_handler() {
        let _ = env_logger::try_init();
        let count = Arc::new(AtomicU64::new(0));
        let c2 = count.clone();
        let handler = Arc::new(move |ev: OperatorAlertEvent| {
            let count = count.clone();
            Box::pin(async move {
                debug!("Handler received alert: {}", ev.alert.title);
                let _ = count.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        });
        let alert_handler = AlertHandler::new(4, handler);
        let producer = alert_handler.subscribe();
        let source = ChannelId::from("allegro-main");
        tokio::spawn(async move {
            for i in 0..5i64 {
                let alert =
                    NewOperatorAlert::sale(&source, &Sku::from(format!("SKU-{i}")), Quantity::from(1), Quantity::from(i));
                producer.publish_event(OperatorAlertEvent::new(alert)).await;
            }
        });

        alert_handler.start_handler().await;
        assert_eq!(c2.load(std::sync::atomic::Ordering::SeqCst), 5);
    }
}
