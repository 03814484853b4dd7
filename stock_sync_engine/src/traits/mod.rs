//! # Capability contracts of the reconciliation engine.
//!
//! This module defines the interfaces a storage backend and the channel integrations must expose in order to be
//! driven by the engine.
//!
//! ## Storage
//! One backend struct implements all of the storage traits; each trait covers one concern:
//!
//! * [`StockLedger`] — the authoritative per-SKU quantity, with an atomic, zero-floored conditional decrement.
//! * [`OrderLedger`] — the append-only idempotency store of `(channel, external order id)` pairs already processed.
//! * [`CredentialStore`] — per-channel access/refresh token persistence.
//! * [`SyncLogStore`] — the queryable, retention-bounded audit trail.
//! * [`AlertStore`] — operator-visible action items.
//! * [`LeaseStore`] — per-channel pass leases that prevent overlapping runs across processes.
//! * [`SyncBackend`] — the umbrella trait tying the above together.
//!
//! ## Channels
//! [`ChannelClient`] is the capability one marketplace integration provides: fetch recent orders, push a stock
//! quantity, delete a listing, and perform the refresh-token exchange. It is object-safe so that N channel
//! implementations can live behind one registry.
mod alert_store;
mod channel_client;
mod credential_store;
mod data_objects;
mod lease_store;
mod order_ledger;
mod stock_ledger;
mod sync_backend;
mod sync_log_store;

pub use alert_store::{AlertStore, AlertStoreError};
pub use channel_client::{ChannelClient, ChannelError, PushOutcome, RemoteLineItem, RemoteOrder};
pub use credential_store::{CredentialStore, CredentialStoreError};
pub use data_objects::InsertOrderResult;
pub use lease_store::{LeaseError, LeaseStore};
pub use order_ledger::{OrderLedger, OrderLedgerError};
pub use stock_ledger::{StockLedger, StockLedgerError};
pub use sync_backend::{BackendError, SyncBackend};
pub use sync_log_store::{SyncLogError, SyncLogQuery, SyncLogStore};
