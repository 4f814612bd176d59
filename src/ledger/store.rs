mod memory;

pub use memory::{InMemoryAccountStore, InMemoryLedgerStore};

use std::sync::Arc;

use super::account::{Account, AccountId};
use super::error::StoreError;
use super::record::{TransactionId, TransactionRecord};
use super::Decimal;

/// Durable storage of accounts.
///
/// `compare_and_set_balance` is the only concurrency control in the ledger:
/// it must be a single atomic conditional write at the storage layer.
pub trait AccountStore: Send + Sync {
    /// Fetch an account. Fails with `StoreError::NotFound` if it does not exist.
    fn get(&self, id: &AccountId) -> Result<Account, StoreError>;

    /// Insert new accounts whose ids were assigned by the caller.
    fn create_batch(&self, accounts: Vec<Account>) -> Result<Vec<Account>, StoreError>;

    /// Set the balance to `new_balance` only if it still equals `expected`.
    ///
    /// Returns the number of rows written: 1 if applied, 0 if the stored
    /// balance no longer matched (or the row is gone).
    fn compare_and_set_balance(
        &self,
        id: &AccountId,
        expected: Decimal,
        new_balance: Decimal,
    ) -> Result<u64, StoreError>;
}

/// Durable, append-only storage of transaction records.
pub trait LedgerStore: Send + Sync {
    /// Persist a record as given. Never overwrites an existing record.
    fn append(&self, record: TransactionRecord) -> Result<TransactionRecord, StoreError>;

    /// Fetch a record. Fails with `StoreError::NotFound` if it does not exist.
    fn get_by_id(&self, id: &TransactionId) -> Result<TransactionRecord, StoreError>;
}

impl<T: AccountStore + ?Sized> AccountStore for Arc<T> {
    fn get(&self, id: &AccountId) -> Result<Account, StoreError> {
        (**self).get(id)
    }

    fn create_batch(&self, accounts: Vec<Account>) -> Result<Vec<Account>, StoreError> {
        (**self).create_batch(accounts)
    }

    fn compare_and_set_balance(
        &self,
        id: &AccountId,
        expected: Decimal,
        new_balance: Decimal,
    ) -> Result<u64, StoreError> {
        (**self).compare_and_set_balance(id, expected, new_balance)
    }
}

impl<T: LedgerStore + ?Sized> LedgerStore for Arc<T> {
    fn append(&self, record: TransactionRecord) -> Result<TransactionRecord, StoreError> {
        (**self).append(record)
    }

    fn get_by_id(&self, id: &TransactionId) -> Result<TransactionRecord, StoreError> {
        (**self).get_by_id(id)
    }
}
