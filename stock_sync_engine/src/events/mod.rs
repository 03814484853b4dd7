mod dispatch;
mod event_types;
mod hooks;

pub use dispatch::{AlertHandler, AlertProducer, HookFn};
pub use event_types::OperatorAlertEvent;
pub use hooks::{EventHandlers, EventHooks, EventProducers};
