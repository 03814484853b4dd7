//! The public API of the Stock Sync Engine.
//!
//! * [`TokenApi`] — access token lifecycle per channel (cached read, refresh-if-expiring, invalidate-on-rejection).
//! * [`SyncLogApi`] — the never-failing audit trail with a local file fallback.
//! * [`AlertApi`] — operator alerts, persisted and published to event hooks.
//! * [`Reconciler`] — the per-channel reconciliation pass and the all-channels batch.
mod alert_api;
mod errors;
mod pass_objects;
mod reconciler;
mod sync_log_api;
mod token_api;

pub use alert_api::AlertApi;
pub use errors::{PassError, TokenApiError};
pub use pass_objects::{PassSummary, SyncWindows};
pub use reconciler::Reconciler;
pub use sync_log_api::SyncLogApi;
pub use token_api::TokenApi;
