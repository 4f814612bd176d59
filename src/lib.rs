//! Wallet ledger: account balances mutated through an optimistic-concurrency
//! protocol, with every successful mutation recorded as an immutable transaction.

pub mod ledger;

pub use ledger::{
    Account, AccountId, AccountStore, AccountView, BatchProcessor, BatchSummary, Error,
    ErrorKind, InMemoryAccountStore, InMemoryLedgerStore, LedgerError, LedgerStore,
    RetryPolicy, StoreError, TransactionId, TransactionKind, TransactionReceipt,
    TransactionRecord, TransferEngine, TransferRequest, TransferRow, MAX_OPEN_BATCH,
};
