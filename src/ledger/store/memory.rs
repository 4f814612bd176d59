use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use crate::ledger::account::{Account, AccountId};
use crate::ledger::error::StoreError;
use crate::ledger::record::{TransactionId, TransactionRecord};
use crate::ledger::Decimal;

use super::{AccountStore, LedgerStore};

fn poisoned() -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

/// In-memory account store.
///
/// The compare-and-set runs under a single write-lock acquisition, which
/// makes it atomic with respect to every other caller.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<AccountId, Account>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored accounts.
    /// A poisoned lock reads as empty.
    pub fn len(&self) -> usize {
        self.accounts.read().map(|a| a.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AccountStore for InMemoryAccountStore {
    fn get(&self, id: &AccountId) -> Result<Account, StoreError> {
        let accounts = self.accounts.read().map_err(|_| poisoned())?;
        accounts.get(id).cloned().ok_or(StoreError::NotFound)
    }

    fn create_batch(&self, batch: Vec<Account>) -> Result<Vec<Account>, StoreError> {
        let mut accounts = self.accounts.write().map_err(|_| poisoned())?;

        // Validate the whole batch first so nothing is inserted on failure.
        let mut seen = HashSet::with_capacity(batch.len());
        for account in &batch {
            if accounts.contains_key(&account.id()) || !seen.insert(account.id()) {
                return Err(StoreError::Constraint(format!(
                    "duplicate account {}",
                    account.id()
                )));
            }
            if account.balance() != Decimal::ZERO {
                return Err(StoreError::Constraint(format!(
                    "account {} must be created with a zero balance",
                    account.id()
                )));
            }
        }

        for account in &batch {
            accounts.insert(account.id(), account.clone());
        }
        Ok(batch)
    }

    fn compare_and_set_balance(
        &self,
        id: &AccountId,
        expected: Decimal,
        new_balance: Decimal,
    ) -> Result<u64, StoreError> {
        let mut accounts = self.accounts.write().map_err(|_| poisoned())?;

        match accounts.get_mut(id) {
            Some(account) if account.balance() == expected => {
                account.set_balance(new_balance);
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}

/// In-memory append-only ledger store.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    records: RwLock<HashMap<TransactionId, TransactionRecord>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    /// A poisoned lock reads as empty.
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn append(&self, record: TransactionRecord) -> Result<TransactionRecord, StoreError> {
        let mut records = self.records.write().map_err(|_| poisoned())?;

        if records.contains_key(&record.id()) {
            return Err(StoreError::Constraint(format!(
                "duplicate transaction {}",
                record.id()
            )));
        }
        records.insert(record.id(), record.clone());
        Ok(record)
    }

    fn get_by_id(&self, id: &TransactionId) -> Result<TransactionRecord, StoreError> {
        let records = self.records.read().map_err(|_| poisoned())?;
        records.get(id).cloned().ok_or(StoreError::NotFound)
    }
}
