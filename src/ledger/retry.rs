use std::time::Duration;

use super::error::LedgerError;
use super::record::TransactionRecord;
use super::request::TransferRequest;
use super::store::{AccountStore, LedgerStore};
use super::transfer_engine::TransferEngine;

/// Caller-side policy for `BalanceConflict` outcomes.
///
/// Each retry re-invokes `apply` with the same request, so it reads a fresh
/// balance. Every attempt that succeeds produces a new record; there is no
/// deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::ZERO,
        }
    }
}

impl RetryPolicy {
    /// A policy making at most `max_attempts` calls (at least one).
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Never retry.
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn apply<A, L>(
        &self,
        engine: &TransferEngine<A, L>,
        request: &TransferRequest,
    ) -> Result<TransactionRecord, LedgerError>
    where
        A: AccountStore,
        L: LedgerStore,
    {
        let mut attempt = 1;
        loop {
            match engine.apply(request) {
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    log::debug!(
                        "[retry] account={} attempt {}/{} conflicted: {}",
                        request.account_id,
                        attempt,
                        self.max_attempts,
                        e
                    );
                    if !self.backoff.is_zero() {
                        std::thread::sleep(self.backoff * attempt);
                    }
                    attempt += 1;
                }
                outcome => return outcome,
            }
        }
    }
}
