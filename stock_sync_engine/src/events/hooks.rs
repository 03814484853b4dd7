use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{AlertHandler, AlertProducer, HookFn, OperatorAlertEvent};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub alert_producers: Vec<AlertProducer>,
}

pub struct EventHandlers {
    pub on_operator_alert: Option<AlertHandler>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_operator_alert = hooks.on_operator_alert.map(|f| AlertHandler::new(buffer_size, f));
        Self { on_operator_alert }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_operator_alert {
            result.alert_producers.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_operator_alert {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_operator_alert: Option<HookFn>,
}

impl EventHooks {
    pub fn on_operator_alert<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OperatorAlertEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_operator_alert = Some(Arc::new(f));
        self
    }
}
