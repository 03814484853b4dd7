use chrono::{Duration, Utc};
use futures_util::future::join_all;
use log::*;
use serde_json::json;
use ssg_common::Quantity;

use crate::{
    db_types::{ChannelId, NewExternalOrder, NewOperatorAlert, NewSyncLogEntry, Sku, SyncOperation},
    events::EventProducers,
    registry::ChannelRegistry,
    retry::{retry, RetryPolicy},
    sse_api::{AlertApi, PassError, PassSummary, SyncLogApi, SyncWindows, TokenApi},
    traits::{ChannelClient, ChannelError, PushOutcome, RemoteLineItem, RemoteOrder, SyncBackend},
};

/// The per-channel reconciliation orchestrator.
///
/// One pass runs the pipeline `token → fetch → dedupe → persist → decrement → notify → propagate`, with every step
/// leaving a sync log entry. Failures obey a strict blast-radius rule: a token or fetch failure aborts the pass for
/// its own channel only, and a failure while propagating one line item to one sibling channel is caught, logged and
/// alerted at exactly that granularity.
///
/// Passes for different channels are independent; [`Reconciler::run_all_passes`] drives them concurrently and a
/// single channel's failure never fails the batch. Overlapping invocations for the *same* channel are fenced off by
/// a datastore lease, so the guarantee holds across processes.
#[derive(Clone)]
pub struct Reconciler<B> {
    db: B,
    channels: ChannelRegistry,
    tokens: TokenApi<B>,
    log: SyncLogApi<B>,
    alerts: AlertApi<B>,
    retry: RetryPolicy,
    windows: SyncWindows,
    holder: String,
}

/// What a propagation branch did to a sibling channel.
enum PushReport {
    Updated,
    Deleted,
    ManualAction(String),
}

impl<B> Reconciler<B>
where B: SyncBackend
{
    pub fn new(db: B, channels: ChannelRegistry, producers: EventProducers) -> Self {
        let tokens = TokenApi::new(db.clone());
        let log = SyncLogApi::from_env(db.clone());
        let alerts = AlertApi::new(db.clone(), producers);
        let holder = format!("ssg-{}", std::process::id());
        Self { db, channels, tokens, log, alerts, retry: RetryPolicy::default(), windows: SyncWindows::default(), holder }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.tokens = self.tokens.with_retry_policy(retry);
        self.retry = retry;
        self
    }

    pub fn with_windows(mut self, windows: SyncWindows) -> Self {
        self.windows = windows;
        self
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }

    /// One routine reconciliation pass for the channel. Safe to invoke repeatedly and concurrently; a pass that
    /// finds the channel's lease taken returns an empty summary instead of doing duplicate work.
    pub async fn run_pass(&self, channel: &ChannelId) -> PassSummary {
        self.run_windowed_pass(channel, self.windows.routine).await
    }

    /// An on-demand re-sync over a wider window (the default manual window if `window` is `None`). Replayed orders
    /// are absorbed by the dedupe, so this is safe to run at any time.
    pub async fn run_manual_pass(&self, channel: &ChannelId, window: Option<Duration>) -> PassSummary {
        self.run_windowed_pass(channel, window.unwrap_or(self.windows.manual)).await
    }

    /// Runs one pass per registered channel, concurrently. One channel's failure — including a channel that needs
    /// re-authorization — never affects the others; the batch always yields a summary per channel.
    pub async fn run_all_passes(&self) -> Vec<PassSummary> {
        let channels = self.channels.channels();
        info!("🔄️ Starting reconciliation batch over {} channels", channels.len());
        let summaries = join_all(channels.iter().map(|channel| self.run_pass(channel))).await;
        let total_orders = summaries.iter().map(|s| s.new_orders).sum::<usize>();
        let total_errors = summaries.iter().map(|s| s.errors.len()).sum::<usize>();
        info!("🔄️ Reconciliation batch complete: {total_orders} new orders, {total_errors} errors");
        summaries
    }

    async fn run_windowed_pass(&self, channel: &ChannelId, window: Duration) -> PassSummary {
        let mut summary = PassSummary::new(channel.clone());
        let Some(client) = self.channels.get(channel).cloned() else {
            let msg = format!("No client registered for channel {channel}");
            error!("🔄️ {msg}");
            summary.errors.push(msg);
            return summary;
        };
        match self.db.try_acquire_lease(channel, &self.holder, self.windows.lease_stale_after).await {
            Ok(true) => {},
            Ok(false) => {
                info!("🔄️ A pass for {channel} is already running; skipping this invocation");
                self.log
                    .log(NewSyncLogEntry::info(channel, SyncOperation::OrderSync, "Pass skipped: lease already held"))
                    .await;
                return summary;
            },
            Err(e) => {
                error!("🔄️ Could not acquire the pass lease for {channel}: {e}");
                summary.errors.push(e.to_string());
                return summary;
            },
        }
        if let Err(e) = self.execute_pass(channel, client.as_ref(), window, &mut summary).await {
            // Channel-fatal: the pass stops here, siblings are unaffected.
            error!("🔄️ Pass for {channel} aborted: {e}");
            summary.errors.push(e.to_string());
            self.log
                .log(
                    NewSyncLogEntry::error(channel, operation_for(&e), format!("Pass aborted: {e}"))
                        .with_details(json!({ "window_minutes": window.num_minutes() })),
                )
                .await;
        }
        if let Err(e) = self.db.release_lease(channel, &self.holder).await {
            error!("🔄️ Could not release the pass lease for {channel}: {e}");
            summary.errors.push(e.to_string());
        }
        summary
    }

    async fn execute_pass(
        &self,
        channel: &ChannelId,
        client: &dyn ChannelClient,
        window: Duration,
        summary: &mut PassSummary,
    ) -> Result<(), PassError> {
        let token = self.tokens.valid_token(client).await?;
        let since = Utc::now() - window;
        let orders = retry("order fetch", &self.retry, || client.fetch_recent_orders(&token, since))
            .await
            .map_err(PassError::Fetch)?;
        debug!("🔄️ {channel}: fetched {} orders since {since}", orders.len());
        if orders.is_empty() {
            self.log.log(NewSyncLogEntry::info(channel, SyncOperation::OrderSync, "No new orders in window")).await;
            return Ok(());
        }
        // The idempotency boundary: an order seen in an earlier (overlapping) window is dropped here.
        let known = self.db.known_order_ids(channel).await?;
        let (fresh, duplicates): (Vec<RemoteOrder>, Vec<RemoteOrder>) =
            orders.into_iter().partition(|o| !known.contains(&o.external_order_id));
        summary.skipped_duplicates = duplicates.len();
        if !duplicates.is_empty() {
            let skipped = duplicates.iter().map(|o| o.external_order_id.as_str()).collect::<Vec<_>>();
            debug!("🔄️ {channel}: {} orders already processed, skipping", skipped.len());
            self.log
                .log(
                    NewSyncLogEntry::info(
                        channel,
                        SyncOperation::OrderSync,
                        format!("Skipped {} already-processed orders", skipped.len()),
                    )
                    .with_details(json!({ "order_ids": skipped })),
                )
                .await;
        }
        for order in fresh {
            self.ingest_order(channel, order, summary).await;
        }
        Ok(())
    }

    /// Persists one order, then applies its line items. The order record lands *before* any stock mutation, so a
    /// crash between the two is detectable instead of silently re-processed.
    async fn ingest_order(&self, channel: &ChannelId, order: RemoteOrder, summary: &mut PassSummary) {
        let record = NewExternalOrder {
            channel: channel.clone(),
            external_order_id: order.external_order_id.clone(),
            status: order.status.clone(),
            ordered_at: order.created_at,
            lines: order
                .line_items
                .iter()
                .map(|l| crate::db_types::NewOrderLine { sku: l.sku.clone(), quantity: l.quantity })
                .collect(),
        };
        let inserted = retry("order insert", &self.retry, || self.db.insert_order(record.clone())).await;
        match inserted {
            Ok(result) if !result.was_inserted() => {
                // A concurrent pass won the race past our dedupe snapshot. The unique index kept it at-most-once.
                debug!("🔄️ {channel}: order {} was ingested concurrently; skipping", order.external_order_id);
                summary.skipped_duplicates += 1;
                return;
            },
            Ok(_) => {},
            Err(e) => {
                error!("🔄️ {channel}: could not persist order {}: {e}", order.external_order_id);
                summary.errors.push(format!("order {}: {e}", order.external_order_id));
                self.log
                    .log(NewSyncLogEntry::error(
                        channel,
                        SyncOperation::OrderSync,
                        format!("Could not persist order {}: {e}", order.external_order_id),
                    ))
                    .await;
                return;
            },
        }
        summary.new_orders += 1;
        self.log
            .log(
                NewSyncLogEntry::success(
                    channel,
                    SyncOperation::OrderSync,
                    format!("Ingested order {}", order.external_order_id),
                )
                .with_details(json!({
                    "external_order_id": order.external_order_id.as_str(),
                    "lines": order.line_items.len(),
                })),
            )
            .await;
        for line in order.line_items.iter().filter(|l| l.quantity.is_positive()) {
            self.apply_line_item(channel, line, summary).await;
        }
    }

    /// Decrements the local ledger for one line item, then fans the new quantity out to every other channel.
    async fn apply_line_item(&self, channel: &ChannelId, line: &RemoteLineItem, summary: &mut PassSummary) {
        let decremented =
            retry("stock decrement", &self.retry, || self.db.decrement_stock(&line.sku, line.quantity)).await;
        let remaining = match decremented {
            Ok(Some(quantity)) => quantity,
            Ok(None) => {
                // A loose reference: the channel sold something this ledger does not track.
                info!("🔄️ {channel}: unknown SKU {} on order line, skipping", line.sku);
                self.log
                    .log(NewSyncLogEntry::info(
                        channel,
                        SyncOperation::StockUpdate,
                        format!("Unknown SKU {} skipped", line.sku),
                    ))
                    .await;
                return;
            },
            Err(e) => {
                error!("🔄️ {channel}: stock decrement for {} failed: {e}", line.sku);
                summary.errors.push(format!("decrement {}: {e}", line.sku));
                self.log
                    .log(NewSyncLogEntry::error(
                        channel,
                        SyncOperation::StockUpdate,
                        format!("Stock decrement for {} failed: {e}", line.sku),
                    ))
                    .await;
                return;
            },
        };
        self.log
            .log(
                NewSyncLogEntry::success(
                    channel,
                    SyncOperation::StockUpdate,
                    format!("Stock for {} decremented by {} to {remaining}", line.sku, line.quantity),
                )
                .with_details(json!({
                    "sku": line.sku.as_str(),
                    "sold": line.quantity.value(),
                    "remaining": remaining.value(),
                })),
            )
            .await;
        // The sale notice is best-effort: the decrement above is already committed and stays committed.
        self.raise_alert(NewOperatorAlert::sale(channel, &line.sku, line.quantity, remaining)).await;
        self.propagate(channel, &line.sku, remaining, summary).await;
    }

    /// Pushes the authoritative quantity to every *other* channel listing the SKU. Branches run together and are
    /// joined; each branch's outcome is observed and logged individually, and no branch can stop another.
    async fn propagate(&self, source: &ChannelId, sku: &Sku, quantity: Quantity, summary: &mut PassSummary) {
        let listed = match self.db.listed_channels(sku).await {
            Ok(listed) => listed,
            Err(e) => {
                error!("🔄️ Could not load listings for {sku}: {e}");
                summary.errors.push(format!("listings {sku}: {e}"));
                return;
            },
        };
        let targets = listed
            .into_iter()
            .filter(|c| c != source)
            .filter_map(|c| match self.channels.get(&c) {
                Some(client) => Some(client.clone()),
                None => {
                    warn!("🔄️ {sku} is listed on {c} but no client is registered for it");
                    None
                },
            })
            .collect::<Vec<_>>();
        if targets.is_empty() {
            return;
        }
        let branches = targets.into_iter().map(|client| {
            let sku = sku.clone();
            async move {
                let report = self.push_to_sibling(client.as_ref(), &sku, quantity).await;
                (client.channel().clone(), report)
            }
        });
        for (target, report) in join_all(branches).await {
            match report {
                Ok(PushReport::Updated) => {
                    self.log
                        .log(NewSyncLogEntry::success(
                            &target,
                            SyncOperation::StockUpdate,
                            format!("Stock for {sku} set to {quantity}"),
                        ))
                        .await;
                },
                Ok(PushReport::Deleted) => {
                    if let Err(e) = self.db.upsert_listing(sku, &target, false).await {
                        error!("🔄️ Could not mark {sku} as delisted on {target}: {e}");
                        summary.errors.push(format!("delist {sku} on {target}: {e}"));
                    }
                    self.log
                        .log(NewSyncLogEntry::success(
                            &target,
                            SyncOperation::StockUpdate,
                            format!("Listing for {sku} removed (stock reached zero)"),
                        ))
                        .await;
                },
                Ok(PushReport::ManualAction(reason)) => {
                    info!("🔄️ {target} requires a manual stock update for {sku}: {reason}");
                    self.raise_alert(NewOperatorAlert::manual_action(source, &target, sku, quantity, &reason)).await;
                    self.log
                        .log(NewSyncLogEntry::info(
                            &target,
                            SyncOperation::StockUpdate,
                            format!("Automated update for {sku} is policy-restricted; operator alerted"),
                        ))
                        .await;
                },
                Err(e) => {
                    error!("🔄️ Stock push for {sku} to {target} failed: {e}");
                    summary.errors.push(format!("push {sku} to {target}: {e}"));
                    self.raise_alert(NewOperatorAlert::push_failed(source, &target, sku, quantity, &e.to_string()))
                        .await;
                    self.log
                        .log(NewSyncLogEntry::error(
                            &target,
                            SyncOperation::StockUpdate,
                            format!("Stock push for {sku} failed: {e}"),
                        ))
                        .await;
                },
            }
        }
    }

    /// One propagation branch: obtains the sibling's own token, then either pushes the quantity or, at zero,
    /// deletes the listing (the only automatic stock-to-zero action every channel supports).
    async fn push_to_sibling(
        &self,
        client: &dyn ChannelClient,
        sku: &Sku,
        quantity: Quantity,
    ) -> Result<PushReport, PassError> {
        let token = self.tokens.valid_token(client).await?;
        if quantity.is_zero() {
            match retry("listing delete", &self.retry, || client.delete_listing(&token, sku)).await {
                Ok(()) => Ok(PushReport::Deleted),
                // Nothing to delete is the desired end state.
                Err(ChannelError::ListingNotFound(_)) => Ok(PushReport::Deleted),
                Err(e) => Err(PassError::Push(e)),
            }
        } else {
            match retry("stock push", &self.retry, || client.push_stock_update(&token, sku, quantity)).await {
                Ok(PushOutcome::Accepted) => Ok(PushReport::Updated),
                Ok(PushOutcome::PolicyRestricted { reason }) => Ok(PushReport::ManualAction(reason)),
                Err(e) => Err(PassError::Push(e)),
            }
        }
    }

    /// Raises an operator alert and leaves a Notification entry in the audit trail. Best-effort on both counts.
    async fn raise_alert(&self, alert: NewOperatorAlert) {
        let source = alert.source_channel.clone();
        let title = alert.title.clone();
        self.alerts.notify(alert).await;
        self.log
            .log(NewSyncLogEntry::info(&source, SyncOperation::Notification, format!("Operator alert raised: {title}")))
            .await;
    }
}

fn operation_for(e: &PassError) -> SyncOperation {
    match e {
        PassError::Token(_) => SyncOperation::TokenRetrieval,
        PassError::Push(_) => SyncOperation::StockUpdate,
        PassError::Fetch(_) | PassError::Store(_) => SyncOperation::OrderSync,
    }
}
