use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use ssg_common::Quantity;
use thiserror::Error;

//--------------------------------------        Sku          ---------------------------------------------------------
/// A stock-keeping unit identifier. The unit of inventory tracked across all channels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Sku(pub String);

impl FromStr for Sku {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for Sku {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Sku {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for Sku {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Sku {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------      ChannelId      ---------------------------------------------------------
/// Identifies one sales channel instance, e.g. `allegro-main` or `storefront`. Several instances of the same
/// marketplace are distinct channels. The same key selects the channel's client in the registry and its row in the
/// credential store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct ChannelId(pub String);

impl FromStr for ChannelId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for ChannelId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ChannelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ChannelId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------   ExternalOrderId   ---------------------------------------------------------
/// The order id as assigned by the channel. Only unique per channel; `(channel, external_order_id)` is the
/// idempotency key that guarantees at-most-once ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct ExternalOrderId(pub String);

impl From<String> for ExternalOrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ExternalOrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for ExternalOrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl ExternalOrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------      StockItem      ---------------------------------------------------------
/// The authoritative stock record for one SKU. `stock_quantity` never goes negative; a decrement that would cross
/// zero is clamped by the ledger's conditional update.
#[derive(Debug, Clone, FromRow)]
pub struct StockItem {
    pub sku: Sku,
    pub stock_quantity: Quantity,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------  ExternalOrderRecord -------------------------------------------------------
/// A channel order that has been ingested. Created once, on first sighting; never updated or deleted by the engine.
#[derive(Debug, Clone, FromRow)]
pub struct ExternalOrderRecord {
    pub id: i64,
    pub channel: ChannelId,
    pub external_order_id: ExternalOrderId,
    /// The status string as reported by the channel. Not interpreted by the engine.
    pub status: String,
    /// The time the order was created on the channel.
    pub ordered_at: DateTime<Utc>,
    pub ingested_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct OrderLineItem {
    pub id: i64,
    pub order_id: i64,
    pub sku: Sku,
    pub quantity: Quantity,
}

//--------------------------------------   NewExternalOrder   --------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExternalOrder {
    pub channel: ChannelId,
    pub external_order_id: ExternalOrderId,
    pub status: String,
    pub ordered_at: DateTime<Utc>,
    pub lines: Vec<NewOrderLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderLine {
    pub sku: Sku,
    pub quantity: Quantity,
}

impl NewExternalOrder {
    pub fn new(channel: ChannelId, external_order_id: ExternalOrderId, ordered_at: DateTime<Utc>) -> Self {
        Self { channel, external_order_id, status: String::new(), ordered_at, lines: Vec::new() }
    }

    pub fn with_status<S: Into<String>>(mut self, status: S) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_line(mut self, sku: Sku, quantity: Quantity) -> Self {
        self.lines.push(NewOrderLine { sku, quantity });
        self
    }
}

//--------------------------------------      TokenPair       --------------------------------------------------------
/// The result of a successful token refresh exchange with a channel.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

//--------------------------------------   AccessCredential   --------------------------------------------------------
/// The stored API credential for one channel. Created by the out-of-band authorization handshake; read and
/// conditionally replaced by the token API.
#[derive(Debug, Clone, FromRow)]
pub struct AccessCredential {
    pub channel: ChannelId,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccessCredential {
    /// True if the access token expires within the given safety margin (or already has).
    pub fn expires_within(&self, margin: Duration) -> bool {
        self.expires_at - Utc::now() <= margin
    }
}

//--------------------------------------    SyncOperation     --------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum SyncOperation {
    /// A reconciliation pass: order fetch, dedupe and ingestion.
    OrderSync,
    /// Access token lookup or refresh.
    TokenRetrieval,
    /// A local stock decrement or a push to a sibling channel.
    StockUpdate,
    /// An operator alert emission.
    Notification,
}

impl Display for SyncOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncOperation::OrderSync => write!(f, "OrderSync"),
            SyncOperation::TokenRetrieval => write!(f, "TokenRetrieval"),
            SyncOperation::StockUpdate => write!(f, "StockUpdate"),
            SyncOperation::Notification => write!(f, "Notification"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid sync operation: {0}")]
pub struct ConversionError(String);

impl FromStr for SyncOperation {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OrderSync" => Ok(Self::OrderSync),
            "TokenRetrieval" => Ok(Self::TokenRetrieval),
            "StockUpdate" => Ok(Self::StockUpdate),
            "Notification" => Ok(Self::Notification),
            s => Err(ConversionError(format!("Invalid sync operation: {s}"))),
        }
    }
}

//--------------------------------------      SyncStatus      --------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum SyncStatus {
    Info,
    Success,
    Error,
}

impl Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncStatus::Info => write!(f, "Info"),
            SyncStatus::Success => write!(f, "Success"),
            SyncStatus::Error => write!(f, "Error"),
        }
    }
}

impl FromStr for SyncStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Info" => Ok(Self::Info),
            "Success" => Ok(Self::Success),
            "Error" => Ok(Self::Error),
            s => Err(ConversionError(format!("Invalid sync status: {s}"))),
        }
    }
}

//--------------------------------------     SyncLogEntry     --------------------------------------------------------
/// One persisted audit trail entry. Append-only; pruned by the retention sweep.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SyncLogEntry {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub channel: ChannelId,
    pub operation: SyncOperation,
    pub status: SyncStatus,
    pub message: String,
    /// Structured JSON payload, stored as text.
    pub details: Option<String>,
}

impl SyncLogEntry {
    pub fn details_json(&self) -> Option<serde_json::Value> {
        self.details.as_deref().and_then(|d| serde_json::from_str(d).ok())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSyncLogEntry {
    pub channel: ChannelId,
    pub operation: SyncOperation,
    pub status: SyncStatus,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl NewSyncLogEntry {
    pub fn info<S: Into<String>>(channel: &ChannelId, operation: SyncOperation, message: S) -> Self {
        Self { channel: channel.clone(), operation, status: SyncStatus::Info, message: message.into(), details: None }
    }

    pub fn success<S: Into<String>>(channel: &ChannelId, operation: SyncOperation, message: S) -> Self {
        Self {
            channel: channel.clone(),
            operation,
            status: SyncStatus::Success,
            message: message.into(),
            details: None,
        }
    }

    pub fn error<S: Into<String>>(channel: &ChannelId, operation: SyncOperation, message: S) -> Self {
        Self { channel: channel.clone(), operation, status: SyncStatus::Error, message: message.into(), details: None }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

//--------------------------------------    OperatorAlert     --------------------------------------------------------
/// An operator-visible action item: a sale notice, a manual-action request for a policy-restricted channel, or a
/// failed propagation. The engine only ever inserts these; operators acknowledge them out of band.
#[derive(Debug, Clone, FromRow)]
pub struct OperatorAlert {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub message: String,
    pub location: String,
    pub source_channel: ChannelId,
    pub acknowledged: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOperatorAlert {
    pub title: String,
    pub message: String,
    pub location: String,
    pub source_channel: ChannelId,
}

impl NewOperatorAlert {
    pub fn new<T: Into<String>, M: Into<String>>(source_channel: &ChannelId, title: T, message: M) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            location: String::new(),
            source_channel: source_channel.clone(),
        }
    }

    pub fn at<L: Into<String>>(mut self, location: L) -> Self {
        self.location = location.into();
        self
    }

    /// A sale notice: stock for `sku` dropped by `sold` on `source` and now stands at `remaining`.
    pub fn sale(source: &ChannelId, sku: &Sku, sold: Quantity, remaining: Quantity) -> Self {
        Self::new(source, format!("Sold {sold} of {sku}"), format!("Stock for {sku} is now {remaining}"))
            .at(format!("stock/{sku}"))
    }

    /// A manual-action request: `channel` refused an automated stock push and an operator must update the listing.
    pub fn manual_action(source: &ChannelId, channel: &ChannelId, sku: &Sku, quantity: Quantity, reason: &str) -> Self {
        Self::new(
            source,
            format!("Manual stock update needed on {channel}"),
            format!("Set {sku} to {quantity} by hand: {reason}"),
        )
        .at(format!("channels/{channel}/{sku}"))
    }

    /// A failed propagation that exhausted its retries.
    pub fn push_failed(source: &ChannelId, channel: &ChannelId, sku: &Sku, quantity: Quantity, error: &str) -> Self {
        Self::new(
            source,
            format!("Stock push to {channel} failed"),
            format!("Could not set {sku} to {quantity}: {error}"),
        )
        .at(format!("channels/{channel}/{sku}"))
    }
}
