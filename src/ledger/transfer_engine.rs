use super::account::{Account, AccountId};
use super::error::{LedgerError, StoreError};
use super::record::{TransactionId, TransactionKind, TransactionRecord};
use super::request::TransferRequest;
use super::store::{AccountStore, LedgerStore};
use super::Decimal;

/// Largest number of accounts `open_accounts` creates in one call.
pub const MAX_OPEN_BATCH: usize = 10;

/// Applies deposits and withdrawals to account balances.
///
/// Each `apply` reads the balance, computes the new one and writes it back with
/// a compare-and-set. No lock is held between the read and the write, so a
/// racing mutation of the same account surfaces as
/// `LedgerError::BalanceConflict`, which the caller is expected to retry.
/// The engine itself never retries.
///
/// ## Known limitation
///
/// If the ledger append fails after the balance write committed, the balance
/// has moved but no record exists. This is logged at `error` level and
/// returned as `StorageFailure`; nothing is rolled back.
#[derive(Debug)]
pub struct TransferEngine<A, L> {
    accounts: A,
    ledger: L,
}

impl<A: AccountStore, L: LedgerStore> TransferEngine<A, L> {
    /// Create a new `TransferEngine` over already-constructed stores
    pub fn new(accounts: A, ledger: L) -> Self {
        log::trace!("TransferEngine initialized");
        Self { accounts, ledger }
    }

    /// Returns the account store
    pub fn accounts(&self) -> &A {
        &self.accounts
    }

    /// Returns the ledger store
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Primary API: apply one balance mutation and record it.
    pub fn apply(&self, request: &TransferRequest) -> Result<TransactionRecord, LedgerError> {
        let account_id = request.account_id;
        let amount = request.amount;
        log::trace!(
            "[{}] account={} amount={}",
            request.kind,
            account_id,
            amount
        );

        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidRequest {
                reason: format!("amount must be positive, got {amount}"),
            });
        }

        // Step 1: Read the balance the write will be conditioned on
        let balance_before = self.load_account(&account_id)?.balance();

        if request.kind == TransactionKind::Withdraw && balance_before < amount {
            return Err(LedgerError::InsufficientFunds {
                account: account_id,
                available: balance_before,
                requested: amount,
            });
        }

        // Step 2: Compute the new balance
        let balance_after = request
            .kind
            .apply_to(balance_before, amount)
            .ok_or_else(|| LedgerError::InvalidRequest {
                reason: format!(
                    "amount {amount} cannot be applied exactly to the balance of account {account_id}"
                ),
            })?
            .normalize();

        // Step 3: Conditional write
        let rows = self
            .accounts
            .compare_and_set_balance(&account_id, balance_before, balance_after)?;
        if rows == 0 {
            log::warn!(
                "[{}] account={} balance changed from {} during the transaction",
                request.kind,
                account_id,
                balance_before
            );
            return Err(LedgerError::BalanceConflict {
                account: account_id,
                expected: balance_before,
            });
        }

        // Step 4: Record what changed
        let record = TransactionRecord::committed(request, balance_before, balance_after);
        let record_id = record.id();

        match self.ledger.append(record) {
            Ok(stored) => {
                log::trace!("{stored}");
                Ok(stored)
            }
            Err(e) => {
                log::error!(
                    "[{}] account={} balance moved {} -> {} but transaction {} was not recorded: {}",
                    request.kind,
                    account_id,
                    balance_before,
                    balance_after,
                    record_id,
                    e
                );
                Err(LedgerError::StorageFailure(e))
            }
        }
    }

    /// Secondary API: look up a previously applied transaction.
    pub fn get_record(&self, id: &TransactionId) -> Result<TransactionRecord, LedgerError> {
        self.ledger.get_by_id(id).map_err(|e| match e {
            StoreError::NotFound => LedgerError::TransactionNotFound { tx: *id },
            other => LedgerError::StorageFailure(other),
        })
    }

    pub fn get_account(&self, id: &AccountId) -> Result<Account, LedgerError> {
        self.load_account(id)
    }

    /// Create `count` zero-balance accounts with fresh identifiers.
    pub fn open_accounts(&self, count: usize) -> Result<Vec<Account>, LedgerError> {
        if count == 0 || count > MAX_OPEN_BATCH {
            return Err(LedgerError::InvalidRequest {
                reason: format!("count must be between 1 and {MAX_OPEN_BATCH}, got {count}"),
            });
        }

        let ids = (0..count).map(|_| AccountId::new()).collect();
        self.register_accounts(ids)
    }

    /// Create zero-balance accounts with caller-supplied identifiers.
    pub fn register_accounts(&self, ids: Vec<AccountId>) -> Result<Vec<Account>, LedgerError> {
        let batch: Vec<Account> = ids.into_iter().map(Account::new).collect();
        let created = self.accounts.create_batch(batch)?;

        for account in &created {
            log::debug!("Created account {}", account.id());
        }
        Ok(created)
    }

    fn load_account(&self, id: &AccountId) -> Result<Account, LedgerError> {
        self.accounts.get(id).map_err(|e| match e {
            StoreError::NotFound => LedgerError::AccountNotFound { account: *id },
            other => LedgerError::StorageFailure(other),
        })
    }
}
