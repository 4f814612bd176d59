use super::account::AccountId;
use super::record::TransactionId;
use super::Decimal;

/// Top-level error type for the batch front end.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Outcome of a failed `apply` / `get_record` call.
///
/// Only `BalanceConflict` is meant to be retried, and only by the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("Account {account} not found")]
    AccountNotFound { account: AccountId },

    #[error("Transaction {tx} not found")]
    TransactionNotFound { tx: TransactionId },

    #[error("Insufficient funds: account {account} has {available}, requested {requested}")]
    InsufficientFunds {
        account: AccountId,
        available: Decimal,
        requested: Decimal,
    },

    #[error("Balance of account {account} changed from {expected} during the transaction, please retry")]
    BalanceConflict { account: AccountId, expected: Decimal },

    #[error("Storage failure: {0}")]
    StorageFailure(#[source] StoreError),
}

/// Stable label for each `LedgerError` family, for outer layers mapping
/// failures onto transport statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidRequest,
    NotFound,
    InsufficientFunds,
    BalanceConflict,
    StorageFailure,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::NotFound => "not_found",
            ErrorKind::InsufficientFunds => "insufficient_funds",
            ErrorKind::BalanceConflict => "balance_conflict",
            ErrorKind::StorageFailure => "storage_failure",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            LedgerError::AccountNotFound { .. } | LedgerError::TransactionNotFound { .. } => {
                ErrorKind::NotFound
            }
            LedgerError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            LedgerError::BalanceConflict { .. } => ErrorKind::BalanceConflict,
            LedgerError::StorageFailure(_) => ErrorKind::StorageFailure,
        }
    }

    /// Whether re-invoking `apply` with the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::BalanceConflict
    }
}

/// Errors raised at the storage boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("row not found")]
    NotFound,

    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        LedgerError::StorageFailure(err)
    }
}
