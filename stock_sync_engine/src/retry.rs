//! Bounded retry with error classification.
//!
//! Every datastore call and every outbound channel call in a reconciliation pass goes through [`retry`]. The
//! classification is the error's own: transient failures (network, timeouts, 5xx, 429, a hiccuping datastore) are
//! retried with a linearly escalating delay; everything else aborts immediately and surfaces the original error.
use std::{fmt::Display, future::Future, time::Duration};

use log::warn;

use crate::traits::{
    AlertStoreError,
    ChannelError,
    CredentialStoreError,
    LeaseError,
    OrderLedgerError,
    StockLedgerError,
    SyncLogError,
};

/// Decides whether an error is worth another attempt.
pub trait RetryClassify {
    fn is_retryable(&self) -> bool;
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, base_delay: Duration::from_millis(500) }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), base_delay }
    }

    /// A policy that retries without sleeping. For tests.
    pub fn no_delay(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    /// Linearly escalating delay: `base_delay` after the first failure, twice that after the second, and so on.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

/// Runs `operation` until it succeeds, its error is classified as non-retryable, or the attempts are exhausted.
/// The last error is surfaced unchanged.
pub async fn retry<T, E, F, Fut>(op_name: &str, policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryClassify + Display,
{
    let mut attempt = 1u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_retryable() || attempt >= policy.max_attempts => return Err(e),
            Err(e) => {
                let delay = policy.delay_for(attempt);
                warn!(
                    "↩️ {op_name} attempt {attempt}/{} failed: {e}. Retrying in {delay:?}",
                    policy.max_attempts
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            },
        }
    }
}

impl RetryClassify for ChannelError {
    fn is_retryable(&self) -> bool {
        matches!(self, ChannelError::Transient(_))
    }
}

// Datastore errors: an engine-level failure (connection, disk) may clear up; domain outcomes never change on
// a replay.
impl RetryClassify for StockLedgerError {
    fn is_retryable(&self) -> bool {
        matches!(self, StockLedgerError::DatabaseError(_))
    }
}

impl RetryClassify for OrderLedgerError {
    fn is_retryable(&self) -> bool {
        matches!(self, OrderLedgerError::DatabaseError(_))
    }
}

impl RetryClassify for CredentialStoreError {
    fn is_retryable(&self) -> bool {
        matches!(self, CredentialStoreError::DatabaseError(_))
    }
}

impl RetryClassify for SyncLogError {
    fn is_retryable(&self) -> bool {
        matches!(self, SyncLogError::DatabaseError(_))
    }
}

impl RetryClassify for AlertStoreError {
    fn is_retryable(&self) -> bool {
        matches!(self, AlertStoreError::DatabaseError(_))
    }
}

impl RetryClassify for LeaseError {
    fn is_retryable(&self) -> bool {
        matches!(self, LeaseError::DatabaseError(_))
    }
}
