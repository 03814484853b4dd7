//! Stock Sync Engine
//!
//! The Stock Sync Engine keeps one physical inventory consistent across several independent sales channels. The same
//! SKU can sell concurrently on any channel, so the engine's job is to pull newly created orders from each channel,
//! convert them into authoritative local stock decrements exactly once, and propagate the resulting quantity to every
//! other channel without overselling or double-deducting.
//!
//! The library is divided into three main sections:
//! 1. Storage management and control ([`mod@sqlite`]). SQLite is the supported backend. You should never need to
//!    access the database directly; use the public API instead. The exception is the data types used by the store,
//!    which are defined in the `db_types` module and are public.
//! 2. The backend and channel capability traits ([`mod@traits`]). A storage backend implements the storage traits to
//!    act as the authoritative ledger, and each marketplace integration implements [`traits::ChannelClient`] to take
//!    part in reconciliation.
//! 3. The engine public API ([`mod@sse_api`]). This provides token lifecycle management, the never-failing sync log,
//!    operator alerts, and the per-channel reconciliation pass itself.
//!
//! The engine also provides a small hook system ([`mod@events`]): operator alerts raised during reconciliation are
//! published to subscribed async handlers so that dashboards or chat relays can react without blocking the sync path.

pub mod db_types;
pub mod events;
pub mod registry;
pub mod retry;
mod sse_api;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use sse_api::{
    AlertApi,
    PassError,
    PassSummary,
    Reconciler,
    SyncLogApi,
    SyncWindows,
    TokenApi,
    TokenApiError,
};
